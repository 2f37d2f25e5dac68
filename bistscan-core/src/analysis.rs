//! Per-symbol analysis: rules + classifier over already fetched series.
//!
//! `analyze_symbol` is a pure function of its inputs. Calling it twice with
//! the same series, parameters and timestamp yields identical output.

use crate::classify::classify;
use crate::domain::{BarSeries, Signal, SymbolSnapshot, Timeframe};
use crate::rules::{evaluate, RuleHits, RuleParams};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Faults that abort the analysis of one symbol.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("series for {actual} passed while analysing {expected}")]
    SymbolMismatch { expected: String, actual: String },

    #[error("expected a {expected} series, got {actual}")]
    WrongTimeframe {
        expected: Timeframe,
        actual: Timeframe,
    },

    /// Only reachable when calling [`analyze_symbol`] directly; the scanner
    /// treats empty fetches as unavailable before analysis runs.
    #[error("{timeframe} series is empty")]
    EmptySeries { timeframe: Timeframe },

    #[error("latest {timeframe} bar has a non-finite price")]
    NonFinitePrice { timeframe: Timeframe },
}

/// Output of one symbol's analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub snapshot: SymbolSnapshot,
    /// Present only if at least one rule fired.
    pub signal: Option<Signal>,
}

pub fn analyze_symbol(
    symbol: &str,
    daily: &BarSeries,
    four_hour: &BarSeries,
    params: &RuleParams,
    at: DateTime<Utc>,
) -> Result<Analysis, AnalysisError> {
    check_series(symbol, daily, Timeframe::Daily)?;
    check_series(symbol, four_hour, Timeframe::FourHour)?;

    // The most recent price available is the last 4h close.
    let price = four_hour
        .last()
        .map(|bar| bar.close)
        .ok_or(AnalysisError::EmptySeries {
            timeframe: Timeframe::FourHour,
        })?;

    let evaluation = evaluate(daily, four_hour, params);
    let hits = evaluation.hits;
    let readings = evaluation.readings;
    let strength = classify(&hits, readings.rsi_4h, params);

    let signal = hits.any_fired().then(|| Signal {
        symbol: symbol.to_string(),
        price,
        time: at,
        triggers: describe(&hits),
        strength,
    });

    let snapshot = SymbolSnapshot {
        symbol: symbol.to_string(),
        price,
        rsi_4h: readings.rsi_4h,
        rsi_daily: readings.rsi_daily,
        supports: readings.levels.supports,
        resistances: readings.levels.resistances,
        ma_crosses: hits.crosses.clone(),
        vol_spike: hits.volume_spike.is_some(),
        volume: readings.volume,
        breakout: hits.breakout,
        g1: hits.g1,
        g2: hits.g2,
        rsi_oversold: readings.rsi_4h.is_some_and(|rsi| rsi < params.rsi_oversold),
        rsi_overbought: readings.rsi_4h.is_some_and(|rsi| rsi > params.rsi_overbought),
        strength,
        ts: at,
    };

    Ok(Analysis { snapshot, signal })
}

fn check_series(symbol: &str, series: &BarSeries, expected: Timeframe) -> Result<(), AnalysisError> {
    if series.symbol() != symbol {
        return Err(AnalysisError::SymbolMismatch {
            expected: symbol.to_string(),
            actual: series.symbol().to_string(),
        });
    }
    if series.timeframe() != expected {
        return Err(AnalysisError::WrongTimeframe {
            expected,
            actual: series.timeframe(),
        });
    }
    let last = series.last().ok_or(AnalysisError::EmptySeries {
        timeframe: expected,
    })?;
    if !(last.close.is_finite() && last.open.is_finite()) {
        return Err(AnalysisError::NonFinitePrice {
            timeframe: expected,
        });
    }
    Ok(())
}

/// Human-readable triggers in fixed order.
fn describe(hits: &RuleHits) -> Vec<String> {
    let mut triggers = Vec::new();
    match (hits.g1, hits.g2) {
        (true, true) => triggers.push("G1+G2: daily and 4h bullish momentum".to_string()),
        (true, false) => triggers.push("G1: daily bullish momentum".to_string()),
        (false, true) => triggers.push("G2: 4h bullish momentum".to_string()),
        (false, false) => {}
    }
    for event in &hits.crosses {
        triggers.push(event.description().to_string());
    }
    if let Some(stats) = &hits.volume_spike {
        triggers.push(format!("Volume spike: {:.2}x average", stats.ratio));
    }
    if let Some(breakout) = &hits.breakout {
        triggers.push(breakout.description());
    }
    if let Some(extreme) = &hits.rsi_extreme {
        triggers.push(extreme.description());
    }
    triggers
}
