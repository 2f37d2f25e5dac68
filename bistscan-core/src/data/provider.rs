//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! files, synthetic walks) so we can swap implementations and mock for tests.

use crate::domain::{BarSeries, Timeframe};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("csv import error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

/// How far back a fetch reaches from the newest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback {
    pub days: u32,
}

impl Lookback {
    pub fn days(days: u32) -> Self {
        Self { days }
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.days))
    }
}

/// Trait for market data providers.
///
/// Implementations return an ordered series or a `DataError`. Callers on the
/// scan path go through [`fetch_available`], which turns every failure into
/// "unavailable" so nothing propagates past this boundary.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` covering `lookback` at the given timeframe.
    fn fetch(
        &self,
        symbol: &str,
        lookback: Lookback,
        timeframe: Timeframe,
    ) -> Result<BarSeries, DataError>;

    /// Whether fetches can succeed right now. The scanner skips a symbol
    /// without fetching when this is false.
    fn is_available(&self) -> bool {
        true
    }
}

/// Fetch a series, or `None` when the provider failed or returned no bars.
pub fn fetch_available(
    provider: &dyn DataProvider,
    symbol: &str,
    lookback: Lookback,
    timeframe: Timeframe,
) -> Option<BarSeries> {
    match provider.fetch(symbol, lookback, timeframe) {
        Ok(series) if !series.is_empty() => Some(series),
        Ok(_) => {
            debug!(symbol, %timeframe, provider = provider.name(), "empty series");
            None
        }
        Err(e) => {
            debug!(symbol, %timeframe, provider = provider.name(), error = %e, "fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl DataProvider for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, symbol: &str, _: Lookback, _: Timeframe) -> Result<BarSeries, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
    }

    struct Empty;

    impl DataProvider for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        fn fetch(&self, symbol: &str, _: Lookback, tf: Timeframe) -> Result<BarSeries, DataError> {
            Ok(BarSeries::new(symbol, tf, Vec::new()).unwrap())
        }
    }

    #[test]
    fn errors_become_unavailable() {
        assert!(fetch_available(&Failing, "X.IS", Lookback::days(10), Timeframe::Daily).is_none());
    }

    #[test]
    fn empty_series_is_unavailable() {
        assert!(fetch_available(&Empty, "X.IS", Lookback::days(10), Timeframe::Daily).is_none());
    }

    #[test]
    fn lookback_duration() {
        assert_eq!(Lookback::days(60).duration(), chrono::Duration::days(60));
    }
}
