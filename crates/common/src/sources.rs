use async_trait::async_trait;

use crate::{Alert, Asset, Candle, Delivery, Result};

/// Supplies the list of assets to scan.
///
/// `CoinGeckoClient` implements this against the public markets endpoint.
/// Market-cap, volume and stablecoin filtering happen here, upstream of the
/// oscillator.
#[async_trait]
pub trait AssetUniverse: Send + Sync {
    async fn assets(&self) -> Result<Vec<Asset>>;
}

/// Supplies candle history for a single pair.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch up to `limit` candles of `interval` (e.g. "15m") for `pair`,
    /// oldest first.
    ///
    /// `Ok(None)` means the source has no data for the pair (unknown symbol,
    /// delisted market). That is a skip, not an error.
    async fn candles(&self, pair: &str, interval: &str, limit: usize) -> Result<Option<Vec<Candle>>>;
}

/// Delivers alerts to the operator.
///
/// `TelegramNotifier` implements this for live alerts, `PaperNotifier` for
/// paper mode. The scanner records an alert as sent only when this returns
/// `Ok(Delivery::Sent)`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<Delivery>;
}
