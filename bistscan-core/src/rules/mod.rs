//! Pattern evaluators: rule predicates over one symbol's bar series.
//!
//! Rules never fail: too few bars, undefined indicators or NaN prices all
//! mean "did not fire". Each rule reports the payload that describes the
//! firing (crossover direction, volume stats, breakout level, ...).

pub mod breakout;
pub mod crossover;
pub mod momentum;
pub mod rsi_extreme;
pub mod volume;

pub use breakout::{Breakout, BreakoutKind, BreakoutRule};
pub use crossover::{
    cross_direction, CrossDirection, CrossEvent, CrossoverRule, MaCrossover, CROSSOVER_MIN_BARS,
};
pub use momentum::{DailyMomentum, IntradayMomentum};
pub use rsi_extreme::{RsiExtreme, RsiExtremeRule};
pub use volume::{VolumeSpikeRule, VolumeStats};

use crate::domain::BarSeries;
use crate::indicators::{extrema_levels, momentum, Levels};
use serde::{Deserialize, Serialize};

/// Trait for rule evaluators.
///
/// `evaluate` must only look at the bars of the series it is given and must
/// return `None` (not panic) when the series is shorter than `min_bars`.
pub trait Rule: Send + Sync {
    /// Payload reported when the rule fires.
    type Hit;

    /// Human-readable name (e.g., "volume_spike").
    fn name(&self) -> &str;

    /// Number of bars needed before the rule can fire.
    fn min_bars(&self) -> usize;

    fn evaluate(&self, series: &BarSeries) -> Option<Self::Hit>;
}

/// Tunable thresholds shared by all rules and the strength classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
    /// RSI window length.
    pub momentum_period: usize,
    /// G2 requires 4h RSI at or below this (or undefined).
    pub g2_rsi_ceiling: f64,
    /// EMA span G2 compares the last 4h close against.
    pub g2_ema_span: usize,
    /// Number of bars averaged before the last one for the volume spike.
    pub volume_window: usize,
    pub volume_multiplier: f64,
    pub extrema_lookback: usize,
    pub extrema_order: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub strong_buy_rsi_ceiling: f64,
    pub strong_sell_rsi_floor: f64,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            momentum_period: 14,
            g2_rsi_ceiling: 60.0,
            g2_ema_span: 20,
            volume_window: 20,
            volume_multiplier: 1.7,
            extrema_lookback: 100,
            extrema_order: 5,
            rsi_oversold: 20.0,
            rsi_overbought: 80.0,
            strong_buy_rsi_ceiling: 70.0,
            strong_sell_rsi_floor: 60.0,
        }
    }
}

impl RuleParams {
    pub fn daily_momentum(&self) -> DailyMomentum {
        DailyMomentum::new(self.momentum_period)
    }

    pub fn intraday_momentum(&self) -> IntradayMomentum {
        IntradayMomentum::new(self.momentum_period, self.g2_rsi_ceiling, self.g2_ema_span)
    }

    pub fn volume_spike(&self) -> VolumeSpikeRule {
        VolumeSpikeRule::new(self.volume_window, self.volume_multiplier)
    }

    pub fn breakout(&self) -> BreakoutRule {
        BreakoutRule::new(self.extrema_lookback, self.extrema_order)
    }

    pub fn rsi_extreme(&self) -> RsiExtremeRule {
        RsiExtremeRule::new(self.momentum_period, self.rsi_oversold, self.rsi_overbought)
    }
}

/// What fired for one symbol in one cycle. Empty fields did not fire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleHits {
    pub g1: bool,
    pub g2: bool,
    pub crosses: Vec<CrossEvent>,
    pub volume_spike: Option<VolumeStats>,
    pub breakout: Option<Breakout>,
    pub rsi_extreme: Option<RsiExtreme>,
}

impl RuleHits {
    pub fn any_fired(&self) -> bool {
        self.g1
            || self.g2
            || !self.crosses.is_empty()
            || self.volume_spike.is_some()
            || self.breakout.is_some()
            || self.rsi_extreme.is_some()
    }

    pub fn crossed(&self, event: CrossEvent) -> bool {
        self.crosses.contains(&event)
    }
}

/// Indicator readings taken while evaluating, kept for the snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readings {
    pub rsi_4h: Option<f64>,
    pub rsi_daily: Option<f64>,
    pub levels: Levels,
    pub volume: Option<VolumeStats>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub readings: Readings,
    pub hits: RuleHits,
}

/// Run every rule for one symbol.
pub fn evaluate(daily: &BarSeries, four_hour: &BarSeries, params: &RuleParams) -> Evaluation {
    let closes_4h = four_hour.closes();
    let rsi_4h = momentum(&closes_4h, params.momentum_period);
    let rsi_daily = momentum(&daily.closes(), params.momentum_period);
    let levels = extrema_levels(&closes_4h, params.extrema_lookback, params.extrema_order);

    let volume_rule = params.volume_spike();
    let volume = volume_rule.stats(four_hour);

    let hits = RuleHits {
        g1: params.daily_momentum().evaluate(daily).is_some(),
        g2: params.intraday_momentum().evaluate(four_hour).is_some(),
        crosses: CrossoverRule::standard().evaluate(daily).unwrap_or_default(),
        volume_spike: volume.filter(|stats| volume_rule.is_spike(stats)),
        breakout: params.breakout().check(four_hour, &levels),
        rsi_extreme: params.rsi_extreme().check(rsi_4h),
    };

    Evaluation {
        readings: Readings {
            rsi_4h,
            rsi_daily,
            levels,
            volume,
        },
        hits,
    }
}
