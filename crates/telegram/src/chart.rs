use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use common::{Error, Result};

const TRADINGVIEW_CHART: &str = "https://www.tradingview.com/chart/";
const HEAD_TIMEOUT: Duration = Duration::from_secs(5);

/// TradingView chart links for alert messages, optionally checked with a
/// HEAD request before use.
#[derive(Debug, Clone)]
pub struct ChartLinks {
    exchange: String,
    verify: bool,
    base_url: String,
    http: Client,
}

impl ChartLinks {
    pub fn new(exchange: impl Into<String>, verify: bool) -> Result<Self> {
        Self::with_base_url(exchange, verify, TRADINGVIEW_CHART)
    }

    pub fn with_base_url(
        exchange: impl Into<String>,
        verify: bool,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(HEAD_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            exchange: exchange.into().to_uppercase(),
            verify,
            base_url: base_url.into(),
            http,
        })
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// `https://www.tradingview.com/chart/?symbol=BYBIT%3ABTCUSDT`
    pub fn url(&self, pair: &str) -> String {
        format!("{}?symbol={}%3A{}", self.base_url, self.exchange, pair)
    }

    /// The chart link for `pair`, or `None` when verification is on and the
    /// link does not answer 200.
    pub async fn resolve(&self, pair: &str) -> Option<String> {
        let url = self.url(pair);
        if !self.verify {
            return Some(url);
        }

        match self.http.head(&url).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                debug!(%pair, "Chart link verified");
                Some(url)
            }
            Ok(resp) => {
                warn!(%pair, status = %resp.status(), "Chart link unavailable");
                None
            }
            Err(e) => {
                warn!(%pair, error = %e, "Chart link check failed");
                None
            }
        }
    }
}
