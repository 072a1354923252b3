use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use common::{Asset, AssetUniverse, Error, Result};

use crate::config::UniverseConfig;

const MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Scan universe from CoinGecko: top coins by market cap, filtered by size,
/// liquidity and the stablecoin list.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: Client,
    url: String,
    api_key: Option<String>,
    filter: UniverseConfig,
}

impl CoinGeckoClient {
    pub fn new(filter: UniverseConfig, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            url: MARKETS_URL.to_string(),
            api_key,
            filter,
        })
    }
}

#[async_trait]
impl AssetUniverse for CoinGeckoClient {
    async fn assets(&self) -> Result<Vec<Asset>> {
        let per_page = self.filter.limit.to_string();
        let mut req = self.http.get(&self.url).query(&[
            ("vs_currency", "usd"),
            ("order", "market_cap_desc"),
            ("per_page", per_page.as_str()),
            ("page", "1"),
        ]);
        if let Some(key) = &self.api_key {
            req = req.header("x-cg-demo-api-key", key);
        }

        let resp = req.send().await.map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::MarketData(format!("CoinGecko HTTP {status}: {body}")));
        }

        let rows: Vec<MarketRow> = serde_json::from_str(&body)?;
        let fetched = rows.len();
        let assets = filter_markets(rows, &self.filter);
        info!(fetched, kept = assets.len(), "Scan universe loaded");
        Ok(assets)
    }
}

/// One row of `coins/markets`. CoinGecko sends `null` for unknown figures.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketRow {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
}

/// Keep rows above both thresholds whose symbol is not a stablecoin.
/// Missing figures count as zero. Order is preserved.
pub fn filter_markets(rows: Vec<MarketRow>, config: &UniverseConfig) -> Vec<Asset> {
    rows.into_iter()
        .filter_map(|row| {
            let symbol = row.symbol.to_uppercase();
            let market_cap = row.market_cap.unwrap_or(0.0);
            let volume_24h = row.total_volume.unwrap_or(0.0);

            if config.stablecoins.iter().any(|s| s.eq_ignore_ascii_case(&symbol)) {
                debug!(%symbol, "Skipping stablecoin");
                return None;
            }
            if market_cap < config.min_market_cap || volume_24h < config.min_volume_24h {
                return None;
            }
            Some(Asset {
                id: row.id,
                symbol,
                name: row.name,
                market_cap,
                volume_24h,
            })
        })
        .collect()
}
