use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result};
use dedup::{AlertStore, TimeBucket};
use strategy::{OscillatorConfig, PriceSource};

/// Scanner settings loaded from `config/trendpulse.toml`.
///
/// Every section and field is optional; anything left out takes the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerFileConfig {
    pub oscillator: OscillatorConfig,
    pub universe: UniverseConfig,
    pub scan: ScanConfig,
    pub alerts: AlertConfig,
    pub notify: NotifyConfig,
}

/// Which assets get scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Number of top-by-market-cap coins requested from CoinGecko.
    pub limit: usize,
    pub min_market_cap: f64,
    pub min_volume_24h: f64,
    /// Upper-case symbols that are never scanned.
    pub stablecoins: Vec<String>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            limit: 111,
            min_market_cap: 50_000_000.0,
            min_volume_24h: 30_000_000.0,
            stablecoins: ["USDT", "USDC", "DAI", "BUSD", "USDE", "FDUSD"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Kline interval, in Binance notation.
    pub interval: String,
    /// Quote asset appended to each symbol to form the pair.
    pub quote: String,
    /// Closed candles kept for the oscillator.
    pub candle_limit: usize,
    /// Fewer closed candles than this and the asset is skipped.
    pub min_candles: usize,
    pub price_source: PriceSource,
    pub concurrency: usize,
    pub request_delay_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval: "15m".into(),
            quote: "USDT".into(),
            candle_limit: 100,
            min_candles: 30,
            price_source: PriceSource::Hlc3,
            concurrency: 4,
            request_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Width of the dedup time bucket.
    pub bucket_minutes: u32,
    /// Local offset used for the bucket label and the alert time (IST by default).
    pub utc_offset_minutes: i32,
    /// Cache entries older than this many hours are dropped on load. 0 keeps all.
    pub retention_hours: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: 1,
            utc_offset_minutes: 330,
            retention_hours: 24,
        }
    }
}

impl AlertConfig {
    pub fn bucket(&self) -> Result<TimeBucket> {
        TimeBucket::new(self.bucket_minutes, self.utc_offset_minutes)
    }

    /// The alert cache at `path` with this retention applied.
    pub fn store(&self, path: impl Into<PathBuf>) -> AlertStore {
        AlertStore::new(path).with_retention_hours(self.retention_hours)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// TradingView exchange prefix for chart links.
    pub chart_exchange: String,
    /// HEAD-check the chart link and skip the alert when it is not 200.
    pub verify_chart_link: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            chart_exchange: "BYBIT".into(),
            verify_chart_link: true,
        }
    }
}

impl ScannerFileConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No scanner config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Scanner config loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("scanner config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.oscillator.validate()?;
        self.alerts.bucket()?;

        if self.scan.concurrency == 0 {
            return Err(Error::Config("scan.concurrency must be at least 1".into()));
        }
        if self.scan.candle_limit < self.scan.min_candles {
            return Err(Error::Config(format!(
                "scan.candle_limit ({}) is below scan.min_candles ({})",
                self.scan.candle_limit, self.scan.min_candles
            )));
        }
        if self.scan.interval.trim().is_empty() {
            return Err(Error::Config("scan.interval is empty".into()));
        }
        if self.universe.limit == 0 {
            return Err(Error::Config("universe.limit must be at least 1".into()));
        }
        Ok(())
    }
}
