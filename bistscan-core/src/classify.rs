//! Strength classifier: merges rule hits into one verdict per symbol per cycle.
//!
//! Predicates are checked in fixed priority order and the first match wins:
//!
//! 1. `strong_buy`: G1 ∧ G2 ∧ golden cross ∧ volume spike ∧ (RSI4h undefined or below ceiling)
//! 2. `buy`: (G1 ∧ G2) ∨ MA20 crossed above MA50
//! 3. `strong_sell`: death cross ∧ volume spike ∧ RSI4h defined and above floor
//! 4. `sell`: MA20 crossed below MA50
//! 5. `none`
//!
//! When buy-side and sell-side predicates hold together (G1/G2 against a
//! death cross, for instance) the earlier verdict wins. This ordering is the
//! tie-break.

use crate::domain::Strength;
use crate::rules::{CrossEvent, RuleHits, RuleParams};

pub fn classify(hits: &RuleHits, rsi_4h: Option<f64>, params: &RuleParams) -> Strength {
    let momentum_pair = hits.g1 && hits.g2;
    let spike = hits.volume_spike.is_some();

    if momentum_pair
        && hits.crossed(CrossEvent::GoldenCross)
        && spike
        && rsi_4h.map_or(true, |rsi| rsi < params.strong_buy_rsi_ceiling)
    {
        return Strength::StrongBuy;
    }
    if momentum_pair || hits.crossed(CrossEvent::Ma20Over50Up) {
        return Strength::Buy;
    }
    if hits.crossed(CrossEvent::DeathCross)
        && spike
        && rsi_4h.is_some_and(|rsi| rsi > params.strong_sell_rsi_floor)
    {
        return Strength::StrongSell;
    }
    if hits.crossed(CrossEvent::Ma20Over50Down) {
        return Strength::Sell;
    }
    Strength::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::VolumeStats;

    fn spike() -> Option<VolumeStats> {
        Some(VolumeStats {
            last_volume: 2000.0,
            average_volume: 1000.0,
            ratio: 2.0,
        })
    }

    fn params() -> RuleParams {
        RuleParams::default()
    }

    #[test]
    fn strong_buy_needs_everything() {
        let hits = RuleHits {
            g1: true,
            g2: true,
            crosses: vec![CrossEvent::GoldenCross],
            volume_spike: spike(),
            ..Default::default()
        };
        assert_eq!(classify(&hits, Some(55.0), &params()), Strength::StrongBuy);
        assert_eq!(classify(&hits, None, &params()), Strength::StrongBuy);
        // Too hot for strong_buy; G1 ∧ G2 still makes it a buy.
        assert_eq!(classify(&hits, Some(70.0), &params()), Strength::Buy);
    }

    #[test]
    fn ma20_up_alone_is_buy() {
        let hits = RuleHits {
            crosses: vec![CrossEvent::Ma20Over50Up],
            ..Default::default()
        };
        assert_eq!(classify(&hits, None, &params()), Strength::Buy);
    }

    #[test]
    fn strong_sell_requires_defined_hot_rsi() {
        let hits = RuleHits {
            crosses: vec![CrossEvent::DeathCross],
            volume_spike: spike(),
            ..Default::default()
        };
        assert_eq!(classify(&hits, Some(75.0), &params()), Strength::StrongSell);
        assert_eq!(classify(&hits, Some(60.0), &params()), Strength::None);
        assert_eq!(classify(&hits, None, &params()), Strength::None);
    }

    #[test]
    fn ma20_down_is_sell() {
        let hits = RuleHits {
            crosses: vec![CrossEvent::Ma20Over50Down, CrossEvent::DeathCross],
            ..Default::default()
        };
        assert_eq!(classify(&hits, Some(75.0), &params()), Strength::Sell);
    }

    #[test]
    fn buy_beats_strong_sell_when_both_hold() {
        let hits = RuleHits {
            g1: true,
            g2: true,
            crosses: vec![CrossEvent::DeathCross],
            volume_spike: spike(),
            ..Default::default()
        };
        assert_eq!(classify(&hits, Some(75.0), &params()), Strength::Buy);
    }

    #[test]
    fn informational_rules_do_not_classify() {
        let hits = RuleHits {
            g1: true,
            volume_spike: spike(),
            rsi_extreme: Some(crate::rules::RsiExtreme::Oversold { rsi: 10.0 }),
            ..Default::default()
        };
        assert_eq!(classify(&hits, Some(10.0), &params()), Strength::None);
    }
}
