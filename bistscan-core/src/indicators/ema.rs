//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA[0] = x[0]. There is no SMA warm-up, so every position is defined
//! and early values lean heavily on the first sample.
//! Lookback: 0.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }

    fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        let Some(&seed) = values.first() else {
            return result;
        };
        if seed.is_nan() {
            return result;
        }
        result[0] = seed;

        let alpha = self.alpha();
        let mut prev = seed;
        for i in 1..n {
            if values[i].is_nan() {
                // Once tainted, the recursion never recovers.
                return result;
            }
            let ema = alpha * values[i] + (1.0 - alpha) * prev;
            result[i] = ema;
            prev = ema;
        }

        result
    }
}

/// EMA of `values` with smoothing factor `2 / (span + 1)`, seeded by the first value.
pub fn exponential_moving_average(values: &[f64], span: usize) -> Vec<f64> {
    Ema::new(span).compute(values)
}
