use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Oscillator and classifier parameters, the `[oscillator]` section of the
/// scanner config file.
///
/// Example:
/// ```toml
/// [oscillator]
/// channel_length = 9
/// average_length = 12
/// smoothing_length = 3
/// margin = 5
/// oversold = -60.0
/// overbought = 60.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OscillatorConfig {
    /// EMA length for the price channel and its mean deviation.
    pub channel_length: usize,
    /// EMA length turning momentum into wave1.
    pub average_length: usize,
    /// SMA length turning wave1 into wave2.
    pub smoothing_length: usize,
    /// Extra samples required beyond the warm-up. Must be at least
    /// `smoothing_length + 1`: wave2 needs `smoothing_length` defined wave1
    /// samples, and the classifier reads two consecutive wave2 samples.
    pub margin: usize,
    /// Both waves at or below this level count as oversold.
    pub oversold: f64,
    /// Both waves at or above this level count as overbought.
    pub overbought: f64,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            channel_length: 9,
            average_length: 12,
            smoothing_length: 3,
            margin: 5,
            oversold: -60.0,
            overbought: 60.0,
        }
    }
}

impl OscillatorConfig {
    /// Samples needed before the oscillator is evaluated at all.
    pub fn min_samples(&self) -> usize {
        self.channel_length + self.average_length + self.margin
    }

    /// Leading samples of wave1 that are always undefined.
    pub fn warmup(&self) -> usize {
        self.channel_length + self.average_length
    }

    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("channel_length", self.channel_length),
            ("average_length", self.average_length),
            ("smoothing_length", self.smoothing_length),
        ];
        for (name, value) in lengths {
            if value == 0 {
                return Err(Error::InvalidParameter(format!("{name} must be >= 1")));
            }
        }
        let min_margin = self.smoothing_length + 1;
        if self.margin < min_margin {
            return Err(Error::InvalidParameter(format!(
                "margin must be >= smoothing_length + 1 ({min_margin}), got {}",
                self.margin
            )));
        }
        if self.oversold.partial_cmp(&self.overbought) != Some(Ordering::Less) {
            return Err(Error::InvalidParameter(format!(
                "oversold ({}) must be below overbought ({})",
                self.oversold, self.overbought
            )));
        }
        Ok(())
    }
}
