//! RSI extremes on 4h closes. Informational: reported as a trigger but not
//! used by the strength classifier.

use super::Rule;
use crate::domain::BarSeries;
use crate::indicators::momentum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RsiExtreme {
    Oversold { rsi: f64 },
    Overbought { rsi: f64 },
}

impl RsiExtreme {
    pub fn description(&self) -> String {
        match self {
            RsiExtreme::Oversold { rsi } => format!("RSI(4h) oversold: {rsi:.1}"),
            RsiExtreme::Overbought { rsi } => format!("RSI(4h) overbought: {rsi:.1}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RsiExtremeRule {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiExtremeRule {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            period,
            oversold,
            overbought,
        }
    }

    pub fn check(&self, rsi: Option<f64>) -> Option<RsiExtreme> {
        let rsi = rsi?;
        if rsi < self.oversold {
            Some(RsiExtreme::Oversold { rsi })
        } else if rsi > self.overbought {
            Some(RsiExtreme::Overbought { rsi })
        } else {
            None
        }
    }
}

impl Rule for RsiExtremeRule {
    type Hit = RsiExtreme;

    fn name(&self) -> &str {
        "rsi_extreme"
    }

    fn min_bars(&self) -> usize {
        self.period + 1
    }

    fn evaluate(&self, series: &BarSeries) -> Option<RsiExtreme> {
        self.check(momentum(&series.closes(), self.period))
    }
}
