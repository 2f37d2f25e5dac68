//! BIST Scan Runner: scan orchestration on top of `bistscan-core`.
//!
//! This crate provides:
//! - The cycle loop with per-symbol fault isolation and interval pacing
//! - The published global state (`SharedState`)
//! - Alert dispatch (Telegram, log)
//! - The status summary and its JSON file sink
//! - TOML configuration with environment overrides

pub mod alert;
pub mod config;
pub mod scanner;
pub mod state;
pub mod status;

pub use alert::{
    format_signal, AlertDispatcher, DeliveryError, DeliveryReport, LogDispatcher,
    TelegramDispatcher,
};
pub use config::{ConfigError, ProviderKind, ScanConfig};
pub use scanner::{
    next_wait, CycleReport, Scanner, Sleeper, SymbolOutcome, ThreadSleeper, MIN_WAIT,
};
pub use state::{ScanState, SharedState, SymbolError};
pub use status::{read_status, JsonFileSink, StatusError, StatusSink, StatusSummary};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn scanner_is_send_sync() {
        assert_send::<Scanner>();
        assert_sync::<Scanner>();
    }

    #[test]
    fn shared_state_is_send_sync() {
        assert_send::<SharedState>();
        assert_sync::<SharedState>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
    }

    #[test]
    fn status_summary_is_send_sync() {
        assert_send::<StatusSummary>();
        assert_sync::<StatusSummary>();
    }
}
