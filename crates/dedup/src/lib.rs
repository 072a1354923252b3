pub mod bucket;
pub mod shared;
pub mod store;

pub use bucket::TimeBucket;
pub use shared::SharedAlertCache;
pub use store::{AlertCache, AlertKey, AlertStore};
