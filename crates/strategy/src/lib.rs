pub mod classifier;
pub mod config;
pub mod indicators;
pub mod series;

pub use classifier::{classify, Evaluation, WaveSamples, Zones};
pub use config::OscillatorConfig;
pub use indicators::{OscillatorState, WaveTrend};
pub use series::{PriceSeries, PriceSource};

use common::{Error, Result, SignalVerdict};

/// Wave trend signal detector: the oscillator engine plus the zone/crossover
/// classifier.
///
/// Stateless and cheap to clone; one instance can be shared by every scan
/// worker.
#[derive(Debug, Clone)]
pub struct TrendPulse {
    engine: WaveTrend,
    zones: Zones,
}

impl TrendPulse {
    /// Fails with `InvalidParameter` on a bad config, before any scanning.
    pub fn new(config: OscillatorConfig) -> Result<Self> {
        let zones = Zones {
            oversold: config.oversold,
            overbought: config.overbought,
        };
        Ok(Self {
            engine: WaveTrend::new(config)?,
            zones,
        })
    }

    pub fn config(&self) -> &OscillatorConfig {
        self.engine.config()
    }

    pub fn min_samples(&self) -> usize {
        self.engine.config().min_samples()
    }

    /// Both wave series for the whole input.
    pub fn waves(&self, series: &PriceSeries) -> Result<OscillatorState> {
        self.engine.compute(series.values())
    }

    /// Evaluate the latest sample. The waves are computed once and the
    /// returned `Evaluation` carries the values used for the verdict.
    pub fn evaluate(&self, series: &PriceSeries) -> Result<Evaluation> {
        self.evaluate_prefix(series.values())
    }

    /// Verdict as it would have been when `index` was the latest sample.
    pub fn verdict_at(&self, series: &PriceSeries, index: usize) -> Result<SignalVerdict> {
        let end = index.saturating_add(1).min(series.len());
        Ok(self.evaluate_prefix(&series.values()[..end])?.verdict)
    }

    fn evaluate_prefix(&self, prices: &[f64]) -> Result<Evaluation> {
        let state = self.engine.compute(prices)?;
        let samples = state.latest().ok_or(Error::InsufficientData {
            required: self.min_samples(),
            available: prices.len(),
        })?;
        Ok(classify(samples, self.zones))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse() -> TrendPulse {
        TrendPulse::new(OscillatorConfig::default()).unwrap()
    }

    /// Steady climb, steady slide, then a rebound.
    fn dip_and_rebound() -> Vec<f64> {
        let mut prices = Vec::new();
        let mut p = 100.0;
        for _ in 0..30 {
            p += 1.0;
            prices.push(p);
        }
        for _ in 0..30 {
            p -= 1.0;
            prices.push(p);
        }
        for _ in 0..20 {
            p += 1.5;
            prices.push(p);
        }
        prices
    }

    fn first_signal(tp: &TrendPulse, series: &PriceSeries) -> Option<(usize, SignalVerdict)> {
        (tp.min_samples() - 1..series.len())
            .map(|i| (i, tp.verdict_at(series, i).unwrap()))
            .find(|(_, v)| *v != SignalVerdict::None)
    }

    #[test]
    fn dip_and_rebound_emits_buy_at_crossing() {
        let tp = pulse();
        let series = PriceSeries::from_values(dip_and_rebound());

        let (index, verdict) = first_signal(&tp, &series).expect("no signal emitted");
        assert_eq!(verdict, SignalVerdict::Buy);

        let eval = tp.evaluate(&PriceSeries::from_values(series.values()[..=index].to_vec())).unwrap();
        assert!(eval.bullish_cross);
        assert!(eval.oversold);
        assert!(eval.wave1() <= -60.0 && eval.wave2() <= -60.0);
        assert!(eval.samples.prev1 <= eval.samples.prev2);
    }

    #[test]
    fn mirrored_series_emits_sell_at_same_index() {
        let tp = pulse();
        let up = PriceSeries::from_values(dip_and_rebound());
        let down = PriceSeries::from_values(up.values().iter().map(|p| 400.0 - p).collect());

        let (buy_index, _) = first_signal(&tp, &up).expect("no buy");
        let (sell_index, verdict) = first_signal(&tp, &down).expect("no sell");
        assert_eq!(verdict, SignalVerdict::Sell);
        assert_eq!(sell_index, buy_index);
    }

    #[test]
    fn short_series_reports_insufficient_data() {
        let series = PriceSeries::from_values((0..10).map(|i| 100.0 + i as f64).collect());
        assert!(matches!(
            pulse().evaluate(&series),
            Err(Error::InsufficientData { required: 26, available: 10 })
        ));
    }

    #[test]
    fn constant_series_is_none() {
        let series = PriceSeries::from_values(vec![7.0; 50]);
        let eval = pulse().evaluate(&series).unwrap();
        assert_eq!(eval.verdict, SignalVerdict::None);
        assert!(!eval.samples.is_defined());
    }

    #[test]
    fn linear_uptrend_never_sells() {
        let tp = pulse();
        let series = PriceSeries::from_values((0..80).map(|i| 50.0 + 0.5 * i as f64).collect());
        for i in tp.min_samples() - 1..series.len() {
            let prefix = PriceSeries::from_values(series.values()[..=i].to_vec());
            let eval = tp.evaluate(&prefix).unwrap();
            assert!(!eval.bearish_cross, "bearish cross at {i}");
            assert_ne!(eval.verdict, SignalVerdict::Sell);
        }
    }

    #[test]
    fn evaluation_reuses_computed_waves() {
        let tp = pulse();
        let series = PriceSeries::from_values(dip_and_rebound());
        let state = tp.waves(&series).unwrap();
        let eval = tp.evaluate(&series).unwrap();
        assert_eq!(eval.wave1().to_bits(), state.wave1[series.len() - 1].to_bits());
        assert_eq!(eval.wave2().to_bits(), state.wave2[series.len() - 1].to_bits());
    }

    #[test]
    fn verdict_at_past_the_end_is_the_latest() {
        let tp = pulse();
        let series = PriceSeries::from_values(dip_and_rebound());
        let latest = tp.evaluate(&series).unwrap().verdict;
        assert_eq!(tp.verdict_at(&series, usize::MAX).unwrap(), latest);
        assert_eq!(tp.verdict_at(&series, series.len()).unwrap(), latest);
    }

    #[test]
    fn minimum_length_input_is_fully_defined() {
        let cfg = OscillatorConfig {
            margin: 4,
            ..OscillatorConfig::default()
        };
        let tp = TrendPulse::new(cfg).unwrap();
        let prices = (0..tp.min_samples())
            .map(|i| 100.0 + 0.3 * i as f64 + 2.0 * (i as f64 * 0.7).sin())
            .collect();
        let eval = tp.evaluate(&PriceSeries::from_values(prices)).unwrap();
        assert_eq!(tp.min_samples(), 25);
        assert!(eval.samples.is_defined());
    }

    #[test]
    fn invalid_config_fails_construction() {
        let cfg = OscillatorConfig {
            average_length: 0,
            ..OscillatorConfig::default()
        };
        assert!(matches!(TrendPulse::new(cfg), Err(Error::InvalidParameter(_))));
    }
}
