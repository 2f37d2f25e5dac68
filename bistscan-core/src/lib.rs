//! BIST Scan Core: signal engine for the technical scanner.
//!
//! This crate holds everything that does not need a clock or a network to be
//! tested:
//! - Domain types (bars, series, signals, per-symbol snapshots)
//! - Indicator library (RSI, SMA, EMA, extrema levels)
//! - Pattern evaluators (G1/G2 momentum, MA crossovers, volume spike, breakout, RSI extremes)
//! - Strength classifier and per-symbol analysis
//! - Market data providers (Yahoo Finance, CSV, synthetic)

pub mod analysis;
pub mod classify;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod rules;

pub use analysis::{analyze_symbol, Analysis, AnalysisError};
pub use classify::classify;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types crossing the scanner's worker threads are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSeries>();
        require_sync::<domain::BarSeries>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::SymbolSnapshot>();
        require_sync::<domain::SymbolSnapshot>();

        require_send::<rules::RuleParams>();
        require_sync::<rules::RuleParams>();
        require_send::<rules::RuleHits>();
        require_sync::<rules::RuleHits>();
        require_send::<analysis::Analysis>();
        require_sync::<analysis::Analysis>();

        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::CsvProvider>();
        require_sync::<data::CsvProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
    }

    /// Rules see a single series and nothing else: no portfolio, no clock.
    #[test]
    fn rule_trait_takes_only_a_series() {
        fn _check_trait_object_builds(
            rule: &dyn rules::Rule<Hit = rules::VolumeStats>,
            series: &domain::BarSeries,
        ) -> Option<rules::VolumeStats> {
            rule.evaluate(series)
        }
    }
}
