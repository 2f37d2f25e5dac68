//! Breakout of the nearest support or resistance level within one bar.

use super::Rule;
use crate::domain::BarSeries;
use crate::indicators::{extrema_levels, Levels};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutKind {
    /// High pushed through the nearest resistance.
    Resistance,
    /// Low pushed through the nearest support.
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakout {
    pub kind: BreakoutKind,
    pub level: f64,
}

impl Breakout {
    pub fn description(&self) -> String {
        match self.kind {
            BreakoutKind::Resistance => format!("Resistance breakout at {:.2}", self.level),
            BreakoutKind::Support => format!("Support breakdown at {:.2}", self.level),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BreakoutRule {
    pub lookback: usize,
    pub order: usize,
}

impl BreakoutRule {
    pub fn new(lookback: usize, order: usize) -> Self {
        Self { lookback, order }
    }

    /// Check the last bar against already computed levels.
    ///
    /// Resistance is checked first; at most one breakout is reported.
    pub fn check(&self, series: &BarSeries, levels: &Levels) -> Option<Breakout> {
        if series.len() < self.min_bars() {
            return None;
        }
        let last = series.last()?;
        let previous = series.previous()?;

        if let Some(level) = levels.nearest_resistance() {
            if last.high > level && previous.close <= level {
                return Some(Breakout {
                    kind: BreakoutKind::Resistance,
                    level,
                });
            }
        }
        if let Some(level) = levels.nearest_support() {
            if last.low < level && previous.close >= level {
                return Some(Breakout {
                    kind: BreakoutKind::Support,
                    level,
                });
            }
        }
        None
    }
}

impl Rule for BreakoutRule {
    type Hit = Breakout;

    fn name(&self) -> &str {
        "breakout"
    }

    fn min_bars(&self) -> usize {
        5
    }

    fn evaluate(&self, series: &BarSeries) -> Option<Breakout> {
        let levels = extrema_levels(&series.closes(), self.lookback, self.order);
        self.check(series, &levels)
    }
}
