//! Request gate shared by every fetch the Yahoo provider makes.
//!
//! A 403 opens the gate at once; a run of consecutive failures opens it too.
//! While open, fetches fail fast with `CircuitBreakerTripped` and the scanner
//! treats those symbols as unavailable for the cycle. The gate closes itself
//! on the first check after the cooldown has passed.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{info, warn};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    Open { since: Instant },
}

#[derive(Debug)]
struct Gate {
    state: BreakerState,
    failures: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    gate: Mutex<Gate>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN, DEFAULT_FAILURE_THRESHOLD)
    }
}

impl CircuitBreaker {
    /// A threshold of 0 is treated as 1.
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            gate: Mutex::new(Gate {
                state: BreakerState::Closed,
                failures: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    // A panicking holder cannot leave the gate half-written.
    fn gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may go out now. Closes an expired gate.
    pub fn is_allowed(&self) -> bool {
        let mut gate = self.gate();
        let BreakerState::Open { since } = gate.state else {
            return true;
        };
        if since.elapsed() < self.cooldown {
            return false;
        }
        gate.state = BreakerState::Closed;
        gate.failures = 0;
        info!("provider cooldown over, requests resumed");
        true
    }

    pub fn record_success(&self) {
        self.gate().failures = 0;
    }

    pub fn record_failure(&self) {
        let mut gate = self.gate();
        gate.failures = gate.failures.saturating_add(1);
        if gate.failures >= self.failure_threshold && gate.state == BreakerState::Closed {
            warn!(
                failures = gate.failures,
                cooldown_secs = self.cooldown.as_secs(),
                "too many provider failures, pausing requests"
            );
            gate.state = BreakerState::Open {
                since: Instant::now(),
            };
        }
    }

    /// Open the gate immediately (provider refused us outright).
    pub fn trip(&self) {
        let mut gate = self.gate();
        if gate.state == BreakerState::Closed {
            warn!(cooldown_secs = self.cooldown.as_secs(), "provider blocked requests, pausing");
        }
        gate.state = BreakerState::Open {
            since: Instant::now(),
        };
    }

    /// Zero when closed.
    pub fn remaining_cooldown(&self) -> Duration {
        match self.gate().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { since } => self.cooldown.saturating_sub(since.elapsed()),
        }
    }
}
