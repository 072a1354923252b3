use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use common::{Candle, Error, MarketDataSource, Result};

const BASE_URL: &str = "https://api.binance.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Largest `limit` the klines endpoint accepts.
const MAX_KLINES: usize = 1000;

/// Public market-data client for Binance spot klines. No API key needed.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn candles(&self, pair: &str, interval: &str, limit: usize) -> Result<Option<Vec<Candle>>> {
        let limit = limit.clamp(1, MAX_KLINES);
        let url = format!(
            "{}/api/v3/klines?symbol={pair}&interval={interval}&limit={limit}",
            self.base_url
        );

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        // Binance answers 400 for symbols it does not list.
        if status == StatusCode::BAD_REQUEST {
            debug!(pair, body = %body, "Pair not listed on Binance");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::MarketData(format!("HTTP {status}: {body}")));
        }

        let candles = parse_klines(&body, Utc::now())?;
        if candles.is_empty() {
            return Ok(None);
        }
        Ok(Some(candles))
    }
}

/// Parse a klines payload (array of arrays). A candle whose close time is
/// not before `now` is still forming and is marked open.
pub fn parse_klines(body: &str, now: DateTime<Utc>) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter().map(|row| parse_row(row, now)).collect()
}

fn parse_row(row: &[Value], now: DateTime<Utc>) -> Result<Candle> {
    let open_time = millis(row, 0)?;
    let close_time = millis(row, 6)?;
    Ok(Candle {
        open_time,
        close_time,
        open: decimal(row, 1)?,
        high: decimal(row, 2)?,
        low: decimal(row, 3)?,
        close: decimal(row, 4)?,
        volume: decimal(row, 5)?,
        is_closed: close_time < now,
    })
}

fn millis(row: &[Value], idx: usize) -> Result<DateTime<Utc>> {
    row.get(idx)
        .and_then(Value::as_i64)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| Error::MarketData(format!("kline field {idx} is not a timestamp")))
}

// Prices and volumes arrive as decimal strings.
fn decimal(row: &[Value], idx: usize) -> Result<f64> {
    row.get(idx)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| Error::MarketData(format!("kline field {idx} is not a decimal")))
}
