use common::{Error, Result};

/// Exponential moving average over `series` (oldest first).
///
/// Smoothing factor `2 / (length + 1)`, seeded with the first sample and
/// defined from index 0 onward (pandas `ewm(span=length, adjust=False)`).
///
/// Non-finite samples never poison the average: outputs before the first
/// finite sample are `NAN`, and a non-finite sample after that carries the
/// previous value forward.
pub fn exponential_average(series: &[f64], length: usize) -> Result<Vec<f64>> {
    check_length("exponential_average", length)?;
    let factor = 2.0 / (length as f64 + 1.0);

    let mut prev = f64::NAN;
    let averaged = series
        .iter()
        .map(|&x| {
            if x.is_finite() {
                prev = if prev.is_finite() {
                    prev + (x - prev) * factor
                } else {
                    x
                };
            }
            prev
        })
        .collect();
    Ok(averaged)
}

/// Trailing arithmetic mean of `length` samples.
///
/// Indices below `length - 1` are `NAN`, as is any index whose window
/// contains a `NAN`.
pub fn simple_average(series: &[f64], length: usize) -> Result<Vec<f64>> {
    check_length("simple_average", length)?;

    let mut averaged = vec![f64::NAN; series.len()];
    for (i, window) in series.windows(length).enumerate() {
        averaged[i + length - 1] = window.iter().sum::<f64>() / length as f64;
    }
    Ok(averaged)
}

fn check_length(name: &str, length: usize) -> Result<()> {
    if length == 0 {
        return Err(Error::InvalidParameter(format!(
            "{name}: averaging length must be >= 1"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            if e.is_nan() {
                assert!(a.is_nan(), "index {i}: expected NaN, got {a}");
            } else {
                assert!((a - e).abs() < 1e-9, "index {i}: expected {e}, got {a}");
            }
        }
    }

    #[test]
    fn ema_matches_adjust_false_recurrence() {
        // pd.Series([10, 11, 12, 13]).ewm(span=3, adjust=False).mean()
        let ema = exponential_average(&[10.0, 11.0, 12.0, 13.0], 3).unwrap();
        assert_close(&ema, &[10.0, 10.5, 11.25, 12.125]);
    }

    #[test]
    fn ema_length_one_is_identity() {
        let prices = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_close(&exponential_average(&prices, 1).unwrap(), &prices);
    }

    #[test]
    fn ema_seeds_at_first_finite_sample() {
        let ema = exponential_average(&[f64::NAN, 10.0, 12.0], 3).unwrap();
        assert_close(&ema, &[f64::NAN, 10.0, 11.0]);
    }

    #[test]
    fn ema_carries_value_over_gaps() {
        let ema = exponential_average(&[10.0, f64::NAN, 12.0], 3).unwrap();
        assert_close(&ema, &[10.0, 10.0, 11.0]);
    }

    #[test]
    fn sma_is_undefined_during_warmup() {
        let sma = simple_average(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_close(&sma, &[f64::NAN, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn sma_window_with_nan_is_undefined() {
        let sma = simple_average(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2).unwrap();
        assert_close(&sma, &[f64::NAN, f64::NAN, f64::NAN, 3.5, 4.5]);
    }

    #[test]
    fn sma_longer_than_series_is_all_nan() {
        let sma = simple_average(&[1.0, 2.0], 3).unwrap();
        assert!(sma.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zero_length_is_invalid() {
        assert!(matches!(
            exponential_average(&[1.0], 0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            simple_average(&[1.0], 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_series_yields_empty_output() {
        assert!(exponential_average(&[], 3).unwrap().is_empty());
        assert!(simple_average(&[], 3).unwrap().is_empty());
    }
}
