pub mod binance;
pub mod coingecko;
pub mod config;
pub mod lifecycle;
pub mod scanner;

pub use binance::BinanceClient;
pub use coingecko::CoinGeckoClient;
pub use config::{AlertConfig, NotifyConfig, ScanConfig, ScannerFileConfig, UniverseConfig};
pub use lifecycle::{Scheduler, SchedulerHandle};
pub use scanner::{AssetOutcome, ScanSummary, Scanner};
