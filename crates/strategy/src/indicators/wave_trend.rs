//! Wave trend oscillator.
//!
//! ```text
//! base      = EMA(price, channel)
//! deviation = EMA(|price - base|, channel)
//! momentum  = (price - base) / (0.015 * deviation)
//! wave1     = EMA(momentum, average)
//! wave2     = SMA(wave1, smoothing)
//! ```
//!
//! Undefined samples are `NAN`: the first `channel + average` samples of
//! wave1, every sample whose deviation is zero, and every wave2 sample whose
//! window touches one of those.
use tracing::trace;

use common::{Error, Result};

use super::moving_average::{exponential_average, simple_average};
use crate::classifier::WaveSamples;
use crate::config::OscillatorConfig;

/// Scale constant of the momentum channel index.
pub const MOMENTUM_SCALE: f64 = 0.015;

/// The two aligned wave series, same length as the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorState {
    pub wave1: Vec<f64>,
    pub wave2: Vec<f64>,
}

impl OscillatorState {
    pub fn len(&self) -> usize {
        self.wave1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wave1.is_empty()
    }

    /// Samples at `index` and `index - 1`. `None` for index 0 or out of range.
    pub fn samples_at(&self, index: usize) -> Option<WaveSamples> {
        if index == 0 || index >= self.len() {
            return None;
        }
        Some(WaveSamples {
            prev1: self.wave1[index - 1],
            prev2: self.wave2[index - 1],
            cur1: self.wave1[index],
            cur2: self.wave2[index],
        })
    }

    /// The last two samples.
    pub fn latest(&self) -> Option<WaveSamples> {
        self.len().checked_sub(1).and_then(|i| self.samples_at(i))
    }
}

#[derive(Debug, Clone)]
pub struct WaveTrend {
    config: OscillatorConfig,
}

impl WaveTrend {
    /// Build the engine, rejecting invalid parameters up front.
    pub fn new(config: OscillatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OscillatorConfig {
        &self.config
    }

    /// Compute both waves from prices (oldest first).
    /// Fails with `InsufficientData` below `config.min_samples()`.
    pub fn compute(&self, prices: &[f64]) -> Result<OscillatorState> {
        self.check_len(prices)?;
        let cfg = &self.config;

        let (base, deviation) = self.channel(prices)?;
        let momentum: Vec<f64> = prices
            .iter()
            .zip(base.iter().zip(&deviation))
            .map(|(&p, (&b, &d))| channel_index(p, b, d))
            .collect();

        let warmup = cfg.warmup();
        let wave1: Vec<f64> = exponential_average(&momentum, cfg.average_length)?
            .into_iter()
            .zip(&momentum)
            .enumerate()
            .map(|(i, (w, m))| if i < warmup || m.is_nan() { f64::NAN } else { w })
            .collect();
        let wave2 = simple_average(&wave1, cfg.smoothing_length)?;

        let flat = momentum.iter().skip(warmup).filter(|m| m.is_nan()).count();
        if flat > 0 {
            trace!(flat, samples = prices.len(), "Zero-deviation samples left undefined");
        }

        Ok(OscillatorState { wave1, wave2 })
    }

    /// Mean absolute deviation of prices around their channel EMA.
    pub fn deviation(&self, prices: &[f64]) -> Result<Vec<f64>> {
        self.check_len(prices)?;
        Ok(self.channel(prices)?.1)
    }

    fn channel(&self, prices: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let base = exponential_average(prices, self.config.channel_length)?;
        let distance: Vec<f64> = prices
            .iter()
            .zip(&base)
            .map(|(p, b)| (p - b).abs())
            .collect();
        let deviation = exponential_average(&distance, self.config.channel_length)?;
        Ok((base, deviation))
    }

    fn check_len(&self, prices: &[f64]) -> Result<()> {
        let required = self.config.min_samples();
        if prices.len() < required {
            return Err(Error::InsufficientData {
                required,
                available: prices.len(),
            });
        }
        Ok(())
    }
}

/// Zero deviation (flat channel) leaves the sample undefined.
fn channel_index(price: f64, base: f64, deviation: f64) -> f64 {
    if deviation == 0.0 {
        return f64::NAN;
    }
    let value = (price - base) / (MOMENTUM_SCALE * deviation);
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}
