//! Support and resistance levels from local extrema of closes.
//!
//! A close at position i of the lookback window is a local maximum (minimum)
//! when it is strictly greater (smaller) than every close within `order`
//! positions on both sides. The neighbourhood is clipped at the window
//! edges; the first and last points never qualify.

use serde::{Deserialize, Serialize};

/// Maximum number of levels reported on each side of the price.
pub const MAX_LEVELS: usize = 3;

/// Levels valid for the cycle that computed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    /// Local minima below the current close, nearest (highest) first.
    pub supports: Vec<f64>,
    /// Local maxima above the current close, nearest (lowest) first.
    pub resistances: Vec<f64>,
}

impl Levels {
    pub fn nearest_support(&self) -> Option<f64> {
        self.supports.first().copied()
    }

    pub fn nearest_resistance(&self) -> Option<f64> {
        self.resistances.first().copied()
    }
}

/// Minimum window length for `extrema_levels` to report anything.
pub fn min_points(order: usize) -> usize {
    2 * order + 3
}

/// Extrema-based levels over the last `lookback` closes.
///
/// Returns empty levels when fewer than `2 * order + 3` closes are available
/// or the current close is not finite.
pub fn extrema_levels(closes: &[f64], lookback: usize, order: usize) -> Levels {
    let window = &closes[closes.len().saturating_sub(lookback)..];
    let n = window.len();
    if order == 0 || n < min_points(order) {
        return Levels::default();
    }
    let current = window[n - 1];
    if !current.is_finite() {
        return Levels::default();
    }

    let mut maxima = Vec::new();
    let mut minima = Vec::new();
    for i in 1..n - 1 {
        let value = window[i];
        let lo = i.saturating_sub(order);
        let hi = (i + order).min(n - 1);
        let neighbours = || (lo..=hi).filter(move |&j| j != i).map(|j| window[j]);
        if neighbours().all(|v| value > v) {
            maxima.push(value);
        } else if neighbours().all(|v| value < v) {
            minima.push(value);
        }
    }

    let mut supports: Vec<f64> = minima.into_iter().filter(|&v| v < current).collect();
    supports.sort_by(|a, b| b.total_cmp(a));
    supports.dedup();
    supports.truncate(MAX_LEVELS);

    let mut resistances: Vec<f64> = maxima.into_iter().filter(|&v| v > current).collect();
    resistances.sort_by(|a, b| a.total_cmp(b));
    resistances.dedup();
    resistances.truncate(MAX_LEVELS);

    Levels {
        supports,
        resistances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Peaks at 110/120/130/140 and troughs at 90/80/70/60 around a 100 base,
    /// each isolated by more than `order` flat points.
    fn wave() -> Vec<f64> {
        let mut closes = Vec::new();
        for (peak, trough) in [(110.0, 90.0), (120.0, 80.0), (130.0, 70.0), (140.0, 60.0)] {
            closes.extend([100.0, 101.0, 102.0, peak, 102.0, 101.0, 100.0]);
            closes.extend([99.0, 98.0, trough, 98.0, 99.0]);
        }
        closes.extend([100.0, 100.0, 100.0]);
        closes
    }

    #[test]
    fn too_short_window_is_empty() {
        let closes = vec![1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0, 3.0];
        assert_eq!(closes.len(), min_points(5) - 1);
        assert_eq!(extrema_levels(&closes, 100, 5), Levels::default());
    }

    #[test]
    fn levels_are_nearest_first_and_capped() {
        let levels = extrema_levels(&wave(), 100, 2);
        assert_eq!(levels.resistances, vec![110.0, 120.0, 130.0]);
        assert_eq!(levels.supports, vec![90.0, 80.0, 70.0]);
        assert_eq!(levels.nearest_resistance(), Some(110.0));
        assert_eq!(levels.nearest_support(), Some(90.0));
    }

    #[test]
    fn lookback_restricts_window() {
        // Only the last trough remains in view.
        let closes = wave();
        let levels = extrema_levels(&closes, 10, 2);
        assert_eq!(levels.resistances, Vec::<f64>::new());
        assert_eq!(levels.supports, vec![60.0]);
    }

    #[test]
    fn plateaus_are_not_extrema() {
        let closes = [100.0; 30];
        assert_eq!(extrema_levels(&closes, 100, 5), Levels::default());
    }

    #[test]
    fn duplicate_levels_collapse() {
        let mut closes = Vec::new();
        for _ in 0..3 {
            closes.extend([100.0, 101.0, 110.0, 101.0, 100.0]);
        }
        closes.push(100.0);
        let levels = extrema_levels(&closes, 100, 2);
        assert_eq!(levels.resistances, vec![110.0]);
    }
}
