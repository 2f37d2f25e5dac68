//! Indicator library.
//!
//! Indicators are pure functions: a close (or volume) series in, a numeric
//! series of the same length out. Undefined positions are `f64::NAN`.
//! Scalar helpers (`momentum`, `extrema_levels`) read only what the rule
//! evaluators need at the latest bar.

pub mod ema;
pub mod extrema;
pub mod rsi;
pub mod sma;

pub use ema::{exponential_moving_average, Ema};
pub use extrema::{extrema_levels, Levels, MAX_LEVELS};
pub use rsi::{momentum, Rsi};
pub use sma::{moving_average, Sma};

/// Trait for series indicators.
///
/// # Look-ahead contamination guard
/// No output value at index t may depend on input from index t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    ///
    /// Returns a `Vec<f64>` of the same length as `values`.
    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// Last element of a series as an `Option`, `None` when missing or NaN.
pub fn last_defined(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| !v.is_nan())
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
