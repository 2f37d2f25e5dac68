//! Signal records, strength verdicts and per-symbol snapshots.

use crate::rules::{Breakout, CrossEvent, VolumeStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranked verdict produced by the strength classifier once per symbol per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    StrongBuy,
    Buy,
    StrongSell,
    Sell,
    None,
}

impl Strength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::StrongBuy => "strong_buy",
            Strength::Buy => "buy",
            Strength::StrongSell => "strong_sell",
            Strength::Sell => "sell",
            Strength::None => "none",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An immutable record of rules firing for one symbol in one cycle.
///
/// Only created when at least one rule fired. `triggers` keeps the
/// human-readable descriptions in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub price: f64,
    pub time: DateTime<Utc>,
    pub triggers: Vec<String>,
    pub strength: Strength,
}

/// Latest analysis view of one symbol. Overwritten every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    pub symbol: String,
    pub price: f64,
    /// RSI of 4-hour closes; `None` when undefined.
    pub rsi_4h: Option<f64>,
    /// RSI of daily closes; `None` when undefined.
    pub rsi_daily: Option<f64>,
    /// Nearest first, at most three.
    pub supports: Vec<f64>,
    /// Nearest first, at most three.
    pub resistances: Vec<f64>,
    pub ma_crosses: Vec<CrossEvent>,
    pub vol_spike: bool,
    pub volume: Option<VolumeStats>,
    pub breakout: Option<Breakout>,
    pub g1: bool,
    pub g2: bool,
    pub rsi_oversold: bool,
    pub rsi_overbought: bool,
    pub strength: Strength,
    pub ts: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Strength::StrongBuy).unwrap(),
            "\"strong_buy\""
        );
        let parsed: Strength = serde_json::from_str("\"strong_sell\"").unwrap();
        assert_eq!(parsed, Strength::StrongSell);
    }
}
