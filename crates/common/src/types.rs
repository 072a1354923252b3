use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// One asset from the scan universe (CoinGecko `coins/markets` row after filtering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Provider id, e.g. "bitcoin".
    pub id: String,
    /// Upper-case base symbol, e.g. "BTC".
    pub symbol: String,
    pub name: String,
    pub market_cap: f64,
    pub volume_24h: f64,
}

impl Asset {
    /// Exchange pair for this asset against `quote`, e.g. `BTC` + `USDT` -> `BTCUSDT`.
    pub fn pair(&self, quote: &str) -> String {
        format!("{}{}", self.symbol.to_uppercase(), quote.to_uppercase())
    }
}

/// A single OHLCV candle from the market data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// True when the candle has closed (finalized). Only closed candles
    /// should feed the oscillator.
    pub is_closed: bool,
}

impl Candle {
    /// Typical price `(high + low + close) / 3`.
    pub fn hlc3(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Direction of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
        }
    }
}

/// Outcome of the signal classifier for one asset at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalVerdict {
    Buy,
    Sell,
    #[default]
    None,
}

impl SignalVerdict {
    pub fn action(&self) -> Option<Action> {
        match self {
            SignalVerdict::Buy => Some(Action::Buy),
            SignalVerdict::Sell => Some(Action::Sell),
            SignalVerdict::None => None,
        }
    }
}

impl std::fmt::Display for SignalVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalVerdict::Buy => write!(f, "BUY"),
            SignalVerdict::Sell => write!(f, "SELL"),
            SignalVerdict::None => write!(f, "NONE"),
        }
    }
}

/// Everything a notifier needs to render and deliver one alert.
#[derive(Debug, Clone)]
pub struct Alert {
    pub asset: Asset,
    /// Exchange pair the signal was computed on, e.g. "BTCUSDT".
    pub pair: String,
    pub action: Action,
    pub wave1: f64,
    pub wave2: f64,
    /// Candle interval the signal was computed on, e.g. "15m".
    pub interval: String,
    /// Scan time in the operator's local offset.
    pub local_time: DateTime<FixedOffset>,
    /// Dedup bucket label the alert was recorded under.
    pub bucket: String,
}

/// Result of a delivery attempt that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The sink confirmed the alert. Only this outcome is recorded for dedup.
    Sent,
    /// The sink chose not to send (e.g. chart link unavailable).
    Skipped { reason: String },
}

/// Whether alerts go to Telegram or are only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    Live,
    #[default]
    Paper,
}

impl std::fmt::Display for NotifyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyMode::Live => write!(f, "live"),
            NotifyMode::Paper => write!(f, "paper"),
        }
    }
}
