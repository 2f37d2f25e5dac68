//! Scan orchestrator: one cycle over the symbol universe, then pace the next.
//!
//! Each cycle:
//! 1. publish `running = true` and the cycle start time
//! 2. per symbol, in listed order: fetch daily + 4h bars, analyze, dispatch
//!    and record any signal; unavailable data skips the symbol, a fault
//!    (analysis error or panic) is recorded and the cycle moves on
//! 3. replace the snapshot map and error list with this cycle's
//! 4. publish the status summary
//! 5. sleep `max(1s, interval - elapsed)`
//!
//! Nothing inside a cycle is fatal. A provider that reports itself
//! unavailable (Yahoo while its breaker is open) skips symbols unfetched.
//!
//! In parallel mode alerts still go out in listed order after the join, but
//! the signal history only changes together with the snapshot map and error
//! list, so readers never see a half-applied cycle.

use crate::alert::{format_signal, startup_message, AlertDispatcher};
use crate::config::ScanConfig;
use crate::state::{SharedState, SymbolError};
use crate::status::{StatusSink, StatusSummary};
use bistscan_core::analysis::{analyze_symbol, Analysis};
use bistscan_core::data::{fetch_available, DataProvider};
use bistscan_core::domain::{Signal, SymbolSnapshot, Timeframe};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Shortest pause between cycles, even when a cycle overruns the interval.
pub const MIN_WAIT: Duration = Duration::from_secs(1);

/// The only suspension point of the loop, abstracted so tests can observe it.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Wait before the next cycle: the rest of the interval, never under [`MIN_WAIT`].
pub fn next_wait(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed).max(MIN_WAIT)
}

/// What happened to one symbol in one cycle.
#[derive(Debug)]
pub enum SymbolOutcome {
    /// Data unavailable; not an error.
    Skipped,
    Analyzed(Box<Analysis>),
    Failed(String),
}

/// Summary of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub analyzed: usize,
    pub skipped: usize,
    pub signals: Vec<Signal>,
    pub errors: Vec<SymbolError>,
}

pub struct Scanner {
    config: ScanConfig,
    provider: Box<dyn DataProvider>,
    dispatcher: Box<dyn AlertDispatcher>,
    sink: Box<dyn StatusSink>,
    state: SharedState,
}

impl Scanner {
    pub fn new(
        config: ScanConfig,
        provider: Box<dyn DataProvider>,
        dispatcher: Box<dyn AlertDispatcher>,
        sink: Box<dyn StatusSink>,
    ) -> Self {
        Self {
            config,
            provider,
            dispatcher,
            sink,
            state: SharedState::new(),
        }
    }

    /// Read handle to the published state.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Publish the initial (empty) status and send the "worker active" notice.
    pub fn announce(&self) {
        self.publish_status();
        let report = self
            .dispatcher
            .dispatch(&startup_message(), &self.config.alert.chat_ids);
        if !report.all_delivered() {
            warn!(failed = report.failures.len(), "startup notice not fully delivered");
        }
    }

    /// Run cycles forever.
    pub fn run(&self, sleeper: &dyn Sleeper) -> ! {
        loop {
            let report = self.run_cycle();
            sleeper.sleep(next_wait(self.config.interval(), report.elapsed));
        }
    }

    /// Run `n` cycles, pacing after each one like [`Scanner::run`].
    pub fn run_cycles(&self, n: usize, sleeper: &dyn Sleeper) -> Vec<CycleReport> {
        (0..n)
            .map(|_| {
                let report = self.run_cycle();
                sleeper.sleep(next_wait(self.config.interval(), report.elapsed));
                report
            })
            .collect()
    }

    /// One full pass over the universe, without the trailing sleep.
    pub fn run_cycle(&self) -> CycleReport {
        let clock = Instant::now();
        let at = Utc::now();
        self.state.update(|s| {
            s.running = true;
            s.last_run = Some(at);
        });
        info!(cycle_start = %at, symbols = self.config.symbols.len(), "scan cycle started");

        let mut report = CycleReport {
            started_at: at,
            elapsed: Duration::ZERO,
            analyzed: 0,
            skipped: 0,
            signals: Vec::new(),
            errors: Vec::new(),
        };
        let mut snapshots = BTreeMap::new();

        if self.config.parallel {
            let outcomes: Vec<SymbolOutcome> = self
                .config
                .symbols
                .par_iter()
                .map(|symbol| self.process_symbol(symbol, at))
                .collect();
            for (symbol, outcome) in self.config.symbols.iter().zip(outcomes) {
                self.absorb(symbol, outcome, &mut snapshots, &mut report, false);
            }
        } else {
            for symbol in &self.config.symbols {
                let outcome = self.process_symbol(symbol, at);
                self.absorb(symbol, outcome, &mut snapshots, &mut report, true);
            }
        }

        let errors = report.errors.clone();
        let deferred = if self.config.parallel {
            report.signals.clone()
        } else {
            Vec::new()
        };
        let limit = self.config.signal_history_limit;
        self.state.update(move |s| {
            for signal in deferred {
                s.record_signal(signal, limit);
            }
            s.per_symbol = snapshots;
            s.errors = errors;
            s.cycles += 1;
        });
        self.publish_status();

        report.elapsed = clock.elapsed();
        info!(
            analyzed = report.analyzed,
            skipped = report.skipped,
            signals = report.signals.len(),
            errors = report.errors.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "scan cycle finished"
        );
        report
    }

    /// Fetch and analyze one symbol. Never panics and never returns an error.
    pub fn process_symbol(&self, symbol: &str, at: DateTime<Utc>) -> SymbolOutcome {
        let work = AssertUnwindSafe(|| {
            if !self.provider.is_available() {
                debug!(symbol, provider = self.provider.name(), "provider paused");
                return Ok(None);
            }
            let daily = fetch_available(
                self.provider.as_ref(),
                symbol,
                self.config.data.daily_lookback(),
                Timeframe::Daily,
            );
            let Some(daily) = daily else {
                return Ok(None);
            };
            let four_hour = fetch_available(
                self.provider.as_ref(),
                symbol,
                self.config.data.intraday_lookback(),
                Timeframe::FourHour,
            );
            let Some(four_hour) = four_hour else {
                return Ok(None);
            };
            analyze_symbol(symbol, &daily, &four_hour, &self.config.rules, at).map(Some)
        });

        match panic::catch_unwind(work) {
            Ok(Ok(Some(analysis))) => SymbolOutcome::Analyzed(Box::new(analysis)),
            Ok(Ok(None)) => SymbolOutcome::Skipped,
            Ok(Err(e)) => SymbolOutcome::Failed(e.to_string()),
            Err(payload) => {
                SymbolOutcome::Failed(format!("panicked: {}", panic_message(payload.as_ref())))
            }
        }
    }

    fn absorb(
        &self,
        symbol: &str,
        outcome: SymbolOutcome,
        snapshots: &mut BTreeMap<String, SymbolSnapshot>,
        report: &mut CycleReport,
        record_now: bool,
    ) {
        match outcome {
            SymbolOutcome::Skipped => {
                debug!(symbol, "data unavailable, skipped");
                report.skipped += 1;
            }
            SymbolOutcome::Failed(error) => {
                warn!(symbol, %error, "symbol failed");
                report.errors.push(SymbolError {
                    symbol: symbol.to_string(),
                    error,
                });
            }
            SymbolOutcome::Analyzed(analysis) => {
                let Analysis { snapshot, signal } = *analysis;
                report.analyzed += 1;
                snapshots.insert(symbol.to_string(), snapshot);
                if let Some(signal) = signal {
                    self.alert(&signal);
                    if record_now {
                        let limit = self.config.signal_history_limit;
                        self.state.update(|s| s.record_signal(signal.clone(), limit));
                    }
                    report.signals.push(signal);
                }
            }
        }
    }

    fn alert(&self, signal: &Signal) {
        info!(symbol = %signal.symbol, strength = %signal.strength, price = signal.price, "signal");
        let report = self
            .dispatcher
            .dispatch(&format_signal(signal), &self.config.alert.chat_ids);
        if !report.all_delivered() {
            warn!(symbol = %signal.symbol, failed = report.failures.len(), "alert not fully delivered");
        }
    }

    fn publish_status(&self) {
        let summary = StatusSummary::from_state(&self.state.load(), Utc::now());
        if let Err(e) = self.sink.publish(&summary) {
            error!(error = %e, "status publish failed");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_fills_the_rest_of_the_interval() {
        assert_eq!(
            next_wait(Duration::from_secs(900), Duration::from_secs(120)),
            Duration::from_secs(780)
        );
    }

    #[test]
    fn overrun_still_yields_one_second() {
        assert_eq!(next_wait(Duration::from_secs(10), Duration::from_secs(45)), MIN_WAIT);
        assert_eq!(next_wait(Duration::from_millis(10), Duration::from_millis(30)), MIN_WAIT);
        assert_eq!(next_wait(Duration::from_millis(1500), Duration::from_millis(1000)), MIN_WAIT);
    }

    #[test]
    fn panic_payloads_are_readable() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(boxed.as_ref()), "owned boom");
        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
