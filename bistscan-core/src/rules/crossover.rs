//! Moving average crossover: 20/50 crosses plus golden and death crosses.
//!
//! A crossover fires only on a direction change between the last two bars:
//! up when fast <= slow on the previous bar and fast > slow on the last bar,
//! down when fast >= slow on the previous bar and fast < slow on the last.

use super::Rule;
use crate::domain::BarSeries;
use crate::indicators::moving_average;
use serde::{Deserialize, Serialize};

/// Daily bars required before any crossover is reported.
pub const CROSSOVER_MIN_BARS: usize = 210;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossDirection {
    Up,
    Down,
}

/// Crossover events reported by [`CrossoverRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossEvent {
    Ma20Over50Up,
    Ma20Over50Down,
    /// MA50 crosses above MA200.
    GoldenCross,
    /// MA50 crosses below MA200.
    DeathCross,
}

impl CrossEvent {
    pub fn label(&self) -> &'static str {
        match self {
            CrossEvent::Ma20Over50Up => "MA20↑MA50",
            CrossEvent::Ma20Over50Down => "MA20↓MA50",
            CrossEvent::GoldenCross => "GOLDEN",
            CrossEvent::DeathCross => "DEATH",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CrossEvent::Ma20Over50Up => "MA20 crossed above MA50",
            CrossEvent::Ma20Over50Down => "MA20 crossed below MA50",
            CrossEvent::GoldenCross => "Golden cross: MA50 crossed above MA200",
            CrossEvent::DeathCross => "Death cross: MA50 crossed below MA200",
        }
    }
}

/// Direction change between two bars, if any.
pub fn cross_direction(
    fast_prev: f64,
    slow_prev: f64,
    fast_cur: f64,
    slow_cur: f64,
) -> Option<CrossDirection> {
    // NaN guard: all four values must be valid.
    if fast_cur.is_nan() || slow_cur.is_nan() || fast_prev.is_nan() || slow_prev.is_nan() {
        return None;
    }
    if fast_cur > slow_cur && fast_prev <= slow_prev {
        Some(CrossDirection::Up)
    } else if fast_cur < slow_cur && fast_prev >= slow_prev {
        Some(CrossDirection::Down)
    } else {
        None
    }
}

/// One fast/slow simple moving average pair.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        assert!(fast_period >= 1, "fast_period must be >= 1");
        assert!(
            slow_period > fast_period,
            "slow_period must be > fast_period"
        );
        Self {
            fast_period,
            slow_period,
        }
    }

    /// Crossover at the last bar of `closes`.
    pub fn detect(&self, closes: &[f64]) -> Option<CrossDirection> {
        let n = closes.len();
        if n < self.slow_period + 1 {
            return None;
        }
        let fast = moving_average(closes, self.fast_period);
        let slow = moving_average(closes, self.slow_period);
        cross_direction(fast[n - 2], slow[n - 2], fast[n - 1], slow[n - 1])
    }
}

/// The fixed MA20/MA50 and MA50/MA200 pairs on daily closes.
#[derive(Debug, Clone)]
pub struct CrossoverRule {
    short: MaCrossover,
    long: MaCrossover,
}

impl CrossoverRule {
    pub fn standard() -> Self {
        Self {
            short: MaCrossover::new(20, 50),
            long: MaCrossover::new(50, 200),
        }
    }
}

impl Rule for CrossoverRule {
    type Hit = Vec<CrossEvent>;

    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn min_bars(&self) -> usize {
        CROSSOVER_MIN_BARS
    }

    fn evaluate(&self, series: &BarSeries) -> Option<Vec<CrossEvent>> {
        if series.len() < self.min_bars() {
            return None;
        }
        let closes = series.closes();
        let mut events = Vec::new();
        match self.short.detect(&closes) {
            Some(CrossDirection::Up) => events.push(CrossEvent::Ma20Over50Up),
            Some(CrossDirection::Down) => events.push(CrossEvent::Ma20Over50Down),
            None => {}
        }
        match self.long.detect(&closes) {
            Some(CrossDirection::Up) => events.push(CrossEvent::GoldenCross),
            Some(CrossDirection::Down) => events.push(CrossEvent::DeathCross),
            None => {}
        }
        (!events.is_empty()).then_some(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timeframe;
    use crate::rules::test_bars::series;

    fn flat_then(last: f64) -> Vec<f64> {
        let mut closes = vec![100.0; 249];
        closes.push(last);
        closes
    }

    #[test]
    fn direction_requires_reversal() {
        assert_eq!(cross_direction(1.0, 2.0, 3.0, 2.0), Some(CrossDirection::Up));
        assert_eq!(cross_direction(2.0, 2.0, 3.0, 2.0), Some(CrossDirection::Up));
        assert_eq!(cross_direction(3.0, 2.0, 1.0, 2.0), Some(CrossDirection::Down));
        assert_eq!(cross_direction(2.0, 2.0, 1.0, 2.0), Some(CrossDirection::Down));
        // Already above: no new event.
        assert_eq!(cross_direction(3.0, 2.0, 4.0, 2.0), None);
        // Touching without crossing.
        assert_eq!(cross_direction(1.0, 2.0, 2.0, 2.0), None);
        assert_eq!(cross_direction(f64::NAN, 2.0, 3.0, 2.0), None);
    }

    #[test]
    fn jump_after_flat_fires_both_up_events() {
        // Equal MAs on the previous bar; a jump lifts faster MAs more.
        let events = CrossoverRule::standard()
            .evaluate(&series(Timeframe::Daily, &flat_then(110.0)))
            .unwrap();
        assert_eq!(events, vec![CrossEvent::Ma20Over50Up, CrossEvent::GoldenCross]);
    }

    #[test]
    fn drop_after_flat_fires_both_down_events() {
        let events = CrossoverRule::standard()
            .evaluate(&series(Timeframe::Daily, &flat_then(90.0)))
            .unwrap();
        assert_eq!(events, vec![CrossEvent::Ma20Over50Down, CrossEvent::DeathCross]);
    }

    #[test]
    fn flat_series_has_no_events() {
        let rule = CrossoverRule::standard();
        assert!(rule.evaluate(&series(Timeframe::Daily, &[100.0; 250])).is_none());
    }

    #[test]
    fn fewer_than_210_bars_never_fire() {
        let mut closes = vec![100.0; 208];
        closes.push(110.0);
        assert!(CrossoverRule::standard()
            .evaluate(&series(Timeframe::Daily, &closes))
            .is_none());
    }

    #[test]
    fn pair_detects_at_last_bar_only() {
        let pair = MaCrossover::new(2, 3);
        // fast/slow: prev (2.5 vs 2.0) already above → no new event.
        assert_eq!(pair.detect(&[1.0, 2.0, 3.0, 4.0]), None);
        // prev: fast 2.0 == slow 2.0, last: fast 3.5 > slow 3.0 → up.
        assert_eq!(pair.detect(&[2.0, 2.0, 2.0, 5.0]), Some(CrossDirection::Up));
    }
}
