use serde::{Deserialize, Serialize};

use common::{Candle, Error, Result};

/// Which representative price a candle contributes to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Close,
    /// `(high + low + close) / 3`
    #[default]
    Hlc3,
}

impl PriceSource {
    pub fn sample(&self, candle: &Candle) -> f64 {
        match self {
            PriceSource::Close => candle.close,
            PriceSource::Hlc3 => candle.hlc3(),
        }
    }
}

/// Ordered price samples, one per candle, oldest first. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    values: Vec<f64>,
}

impl PriceSeries {
    /// Build from candles, rejecting duplicate or out-of-order open times.
    pub fn from_candles(candles: &[Candle], source: PriceSource) -> Result<Self> {
        if let Some(pair) = candles
            .windows(2)
            .find(|w| w[1].open_time <= w[0].open_time)
        {
            return Err(Error::UnorderedSeries(format!(
                "candle at {} follows candle at {}",
                pair[1].open_time, pair[0].open_time
            )));
        }
        Ok(Self {
            values: candles.iter().map(|c| source.sample(c)).collect(),
        })
    }

    /// Build from samples already known to be in time order.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
