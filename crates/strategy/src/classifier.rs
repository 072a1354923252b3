use serde::Serialize;

use common::SignalVerdict;

/// Previous and current samples of both waves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveSamples {
    pub prev1: f64,
    pub prev2: f64,
    pub cur1: f64,
    pub cur2: f64,
}

impl WaveSamples {
    pub fn is_defined(&self) -> bool {
        [self.prev1, self.prev2, self.cur1, self.cur2]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Extreme-zone thresholds on the oscillator scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zones {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for Zones {
    fn default() -> Self {
        Self {
            oversold: -60.0,
            overbought: 60.0,
        }
    }
}

/// Verdict for one evaluation, together with the wave values and flags it
/// was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub verdict: SignalVerdict,
    pub samples: WaveSamples,
    pub oversold: bool,
    pub overbought: bool,
    pub bullish_cross: bool,
    pub bearish_cross: bool,
}

impl Evaluation {
    pub fn wave1(&self) -> f64 {
        self.samples.cur1
    }

    pub fn wave2(&self) -> f64 {
        self.samples.cur2
    }
}

/// Classify the latest pair of samples.
///
/// A signal needs a fresh crossover between the previous and the current
/// sample *and* both waves inside the extreme zone at the current sample:
/// `BUY` = bullish cross while oversold, `SELL` = bearish cross while
/// overbought. Undefined samples always classify as `NONE`.
pub fn classify(samples: WaveSamples, zones: Zones) -> Evaluation {
    if !samples.is_defined() {
        return Evaluation {
            verdict: SignalVerdict::None,
            samples,
            oversold: false,
            overbought: false,
            bullish_cross: false,
            bearish_cross: false,
        };
    }

    let WaveSamples {
        prev1,
        prev2,
        cur1,
        cur2,
    } = samples;

    let oversold = cur1 <= zones.oversold && cur2 <= zones.oversold;
    let overbought = cur1 >= zones.overbought && cur2 >= zones.overbought;
    let bullish_cross = prev1 <= prev2 && cur1 > cur2;
    let bearish_cross = prev1 >= prev2 && cur1 < cur2;

    let verdict = if bullish_cross && oversold {
        SignalVerdict::Buy
    } else if bearish_cross && overbought {
        SignalVerdict::Sell
    } else {
        SignalVerdict::None
    };

    Evaluation {
        verdict,
        samples,
        oversold,
        overbought,
        bullish_cross,
        bearish_cross,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(prev1: f64, prev2: f64, cur1: f64, cur2: f64) -> WaveSamples {
        WaveSamples {
            prev1,
            prev2,
            cur1,
            cur2,
        }
    }

    fn verdict(s: WaveSamples) -> SignalVerdict {
        classify(s, Zones::default()).verdict
    }

    #[test]
    fn bullish_cross_in_oversold_zone_is_buy() {
        let eval = classify(samples(-72.0, -70.0, -64.0, -68.0), Zones::default());
        assert_eq!(eval.verdict, SignalVerdict::Buy);
        assert!(eval.bullish_cross && eval.oversold);
        assert_eq!(eval.wave1(), -64.0);
        assert_eq!(eval.wave2(), -68.0);
    }

    #[test]
    fn bearish_cross_in_overbought_zone_is_sell() {
        assert_eq!(verdict(samples(72.0, 70.0, 64.0, 68.0)), SignalVerdict::Sell);
    }

    #[test]
    fn touching_then_crossing_counts_as_cross() {
        assert_eq!(verdict(samples(-70.0, -70.0, -65.0, -69.0)), SignalVerdict::Buy);
        assert_eq!(verdict(samples(70.0, 70.0, 65.0, 69.0)), SignalVerdict::Sell);
    }

    #[test]
    fn cross_outside_zone_is_none() {
        let eval = classify(samples(-42.0, -40.0, -35.0, -38.0), Zones::default());
        assert!(eval.bullish_cross);
        assert!(!eval.oversold);
        assert_eq!(eval.verdict, SignalVerdict::None);
    }

    #[test]
    fn zone_without_fresh_cross_is_none() {
        // wave1 already above wave2 on the previous sample: no new edge.
        let eval = classify(samples(-66.0, -70.0, -63.0, -68.0), Zones::default());
        assert!(eval.oversold);
        assert!(!eval.bullish_cross);
        assert_eq!(eval.verdict, SignalVerdict::None);
    }

    #[test]
    fn only_one_wave_in_zone_is_none() {
        assert_eq!(verdict(samples(-72.0, -58.0, -59.0, -61.0)), SignalVerdict::None);
    }

    #[test]
    fn zone_boundary_is_inclusive() {
        assert_eq!(verdict(samples(-61.0, -60.0, -60.0, -60.5)), SignalVerdict::Buy);
    }

    #[test]
    fn undefined_sample_is_none() {
        for s in [
            samples(f64::NAN, -70.0, -64.0, -68.0),
            samples(-72.0, f64::NAN, -64.0, -68.0),
            samples(-72.0, -70.0, f64::NAN, -68.0),
            samples(-72.0, -70.0, -64.0, f64::INFINITY),
        ] {
            let eval = classify(s, Zones::default());
            assert_eq!(eval.verdict, SignalVerdict::None);
            assert!(!eval.bullish_cross && !eval.oversold);
        }
    }

    #[test]
    fn custom_zones_apply() {
        let zones = Zones {
            oversold: -30.0,
            overbought: 30.0,
        };
        let s = samples(-42.0, -40.0, -35.0, -38.0);
        assert_eq!(classify(s, zones).verdict, SignalVerdict::Buy);
    }
}
