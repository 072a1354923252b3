pub mod config;
pub mod error;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use sources::{AssetUniverse, MarketDataSource, Notifier};
pub use types::*;
