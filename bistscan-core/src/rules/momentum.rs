//! Bullish momentum rules on the daily (G1) and 4-hour (G2) series.

use super::Rule;
use crate::domain::BarSeries;
use crate::indicators::{exponential_moving_average, last_defined, momentum};

/// G1: the last daily bar closes above its open and daily RSI is rising
/// (RSI through the last bar > RSI through the bar before).
#[derive(Debug, Clone)]
pub struct DailyMomentum {
    pub period: usize,
}

impl DailyMomentum {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Rule for DailyMomentum {
    type Hit = ();

    fn name(&self) -> &str {
        "daily_bullish_momentum"
    }

    fn min_bars(&self) -> usize {
        // Two RSI readings, each needing period + 1 closes.
        self.period + 2
    }

    fn evaluate(&self, series: &BarSeries) -> Option<()> {
        if series.len() < self.min_bars() {
            return None;
        }
        if !series.last()?.is_bullish() {
            return None;
        }
        let closes = series.closes();
        let current = momentum(&closes, self.period)?;
        let previous = momentum(&closes[..closes.len() - 1], self.period)?;
        (current > previous).then_some(())
    }
}

/// G2: the last two 4h bars close above their opens, 4h RSI is at or below
/// the ceiling (or undefined), and the last close is at or above the EMA.
#[derive(Debug, Clone)]
pub struct IntradayMomentum {
    pub period: usize,
    pub rsi_ceiling: f64,
    pub ema_span: usize,
}

impl IntradayMomentum {
    pub fn new(period: usize, rsi_ceiling: f64, ema_span: usize) -> Self {
        Self {
            period,
            rsi_ceiling,
            ema_span,
        }
    }
}

impl Rule for IntradayMomentum {
    type Hit = ();

    fn name(&self) -> &str {
        "intraday_bullish_momentum"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, series: &BarSeries) -> Option<()> {
        let last = series.last()?;
        let previous = series.previous()?;
        if !(last.is_bullish() && previous.is_bullish()) {
            return None;
        }

        let closes = series.closes();
        if let Some(rsi) = momentum(&closes, self.period) {
            if rsi > self.rsi_ceiling {
                return None;
            }
        }

        let ema = last_defined(&exponential_moving_average(&closes, self.ema_span))?;
        (last.close >= ema).then_some(())
    }
}
