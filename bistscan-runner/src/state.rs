//! Global scan state.
//!
//! The scanner is the only writer. It builds a new [`ScanState`] value and
//! swaps it in whole, so readers (status sink, CLI, tests) always observe a
//! consistent point-in-time view across every field.

use arc_swap::ArcSwap;
use bistscan_core::domain::{Signal, SymbolSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A per-symbol fault recorded during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolError {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    /// Liveness flag: set at the first cycle, never cleared.
    pub running: bool,
    /// Start of the most recent cycle.
    pub last_run: Option<DateTime<Utc>>,
    pub last_signal: Option<Signal>,
    /// Signals in emission order, oldest first.
    pub signals: Vec<Signal>,
    /// This cycle's snapshots; replaced wholesale at the end of each cycle.
    pub per_symbol: BTreeMap<String, SymbolSnapshot>,
    /// This cycle's faults; replaced wholesale at the end of each cycle.
    pub errors: Vec<SymbolError>,
    /// Completed cycles.
    pub cycles: u64,
}

impl ScanState {
    /// Append a signal, dropping the oldest entries beyond `limit`.
    pub(crate) fn record_signal(&mut self, signal: Signal, limit: Option<usize>) {
        self.last_signal = Some(signal.clone());
        self.signals.push(signal);
        if let Some(limit) = limit {
            let excess = self.signals.len().saturating_sub(limit);
            self.signals.drain(..excess);
        }
    }

    pub fn total_signals(&self) -> usize {
        self.signals.len()
    }
}

/// Cheaply cloneable handle to the published state.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<ArcSwap<ScanState>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(ScanState::default())),
        }
    }

    /// Current snapshot. Holding it never blocks the writer.
    pub fn load(&self) -> Arc<ScanState> {
        self.inner.load_full()
    }

    /// Copy the current state, apply `f`, and publish the result.
    pub(crate) fn update(&self, f: impl FnOnce(&mut ScanState)) {
        let mut next = ScanState::clone(&self.inner.load());
        f(&mut next);
        self.inner.store(Arc::new(next));
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistscan_core::domain::Strength;
    use chrono::TimeZone;

    fn signal(symbol: &str, minute: u32) -> Signal {
        Signal {
            symbol: symbol.to_string(),
            price: 10.0,
            time: Utc.with_ymd_and_hms(2024, 4, 1, 10, minute, 0).unwrap(),
            triggers: vec!["G2: 4h bullish momentum".into()],
            strength: Strength::None,
        }
    }

    #[test]
    fn starts_empty() {
        let state = SharedState::new().load();
        assert!(!state.running);
        assert!(state.last_run.is_none());
        assert!(state.signals.is_empty());
        assert!(state.per_symbol.is_empty());
        assert_eq!(state.cycles, 0);
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let shared = SharedState::new();
        let before = shared.load();
        shared.update(|s| s.running = true);
        assert!(!before.running);
        assert!(shared.load().running);
    }

    #[test]
    fn unbounded_history_keeps_everything() {
        let mut state = ScanState::default();
        for minute in 0..50 {
            state.record_signal(signal("A.IS", minute), None);
        }
        assert_eq!(state.total_signals(), 50);
        assert_eq!(state.last_signal.as_ref().unwrap().time.format("%M").to_string(), "49");
    }

    #[test]
    fn bounded_history_drops_oldest() {
        let mut state = ScanState::default();
        for minute in 0..5 {
            state.record_signal(signal("A.IS", minute), Some(3));
        }
        let minutes: Vec<String> = state
            .signals
            .iter()
            .map(|s| s.time.format("%M").to_string())
            .collect();
        assert_eq!(minutes, vec!["02", "03", "04"]);
        assert_eq!(state.last_signal, state.signals.last().cloned());
    }

    #[test]
    fn clones_share_the_same_state() {
        let shared = SharedState::new();
        let reader = shared.clone();
        shared.update(|s| s.cycles = 7);
        assert_eq!(reader.load().cycles, 7);
    }
}
