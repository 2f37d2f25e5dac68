//! Relative Strength Index (RSI), the momentum oscillator.
//!
//! Uses a simple trailing mean of gains and losses (not Wilder smoothing):
//! for each index t >= period, the last `period` price changes are split into
//! gains and losses and each is averaged.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 with avg_gain > 0 → 100; both zero → undefined (NaN).

use super::Indicator;

/// Per-index RSI series. The scan path only needs the latest value
/// ([`momentum`]); this form backs the indicator benches and series checks.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period + 1 {
            return result;
        }

        for (end, slot) in result.iter_mut().enumerate().skip(self.period) {
            *slot = window_rsi(&values[end - self.period..=end]);
        }

        result
    }
}

/// RSI at the last close, or `None` if fewer than `period + 1` closes exist
/// or the value is undefined (flat window, NaN input).
pub fn momentum(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let value = window_rsi(&closes[closes.len() - period - 1..]);
    (!value.is_nan()).then_some(value)
}

/// RSI over one window of `period + 1` closes (`period` changes).
fn window_rsi(window: &[f64]) -> f64 {
    let period = (window.len() - 1) as f64;
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change.is_nan() {
            return f64::NAN;
        }
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }
    rsi_from_averages(gains / period, losses / period)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            f64::NAN // no movement: ratio is 0/0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rsi_all_gains_is_100() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        assert_eq!(momentum(&closes, 3), Some(100.0));
        let series = Rsi::new(3).compute(&closes);
        assert_approx(series[3], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes = [105.0, 104.0, 103.0, 102.0, 101.0, 100.0];
        assert_eq!(momentum(&closes, 3), Some(0.0));
    }

    #[test]
    fn rsi_flat_is_undefined() {
        assert_eq!(momentum(&[50.0; 20], 14), None);
    }

    #[test]
    fn rsi_simple_mean_known_value() {
        // Changes over the last 3: -0.25, -0.48, +0.72
        // avg_gain = 0.72/3, avg_loss = 0.73/3
        // RSI = 100 - 100 / (1 + 0.72/0.73)
        let closes = [44.0, 44.34, 44.09, 43.61, 44.33];
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(momentum(&closes, 3).unwrap(), expected, 1e-9);
    }

    #[test]
    fn rsi_too_few_closes() {
        assert_eq!(momentum(&[1.0, 2.0, 3.0], 3), None);
        let series = Rsi::new(3).compute(&[1.0, 2.0, 3.0]);
        assert!(series.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_series_matches_scalar_at_each_index() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        let series = Rsi::new(3).compute(&closes);
        for end in 3..closes.len() {
            let scalar = momentum(&closes[..=end], 3).unwrap();
            assert_approx(series[end], scalar, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rsi_bounds() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        for (i, &v) in Rsi::new(3).compute(&closes).iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_nan_in_window_is_undefined() {
        assert_eq!(momentum(&[100.0, f64::NAN, 102.0, 103.0], 3), None);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
