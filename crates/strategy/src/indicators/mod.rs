pub mod moving_average;
pub mod wave_trend;

pub use moving_average::{exponential_average, simple_average};
pub use wave_trend::{OscillatorState, WaveTrend};
