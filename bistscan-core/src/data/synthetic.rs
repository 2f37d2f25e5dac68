//! Deterministic synthetic random-walk provider for offline demos and tests.

use super::provider::{DataError, DataProvider, Lookback};
use crate::domain::{Bar, BarSeries, Timeframe};
use chrono::{DateTime, Datelike, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a seeded random walk per `(symbol, timeframe)`.
///
/// Output is a pure function of the symbol, timeframe, lookback and end time,
/// so repeated fetches agree bar for bar.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: Option<DateTime<Utc>>,
}

impl SyntheticProvider {
    /// Series end at the current time, aligned down to the bar interval.
    pub fn new() -> Self {
        Self { end: None }
    }

    /// Series end at a fixed instant.
    pub fn ending_at(end: DateTime<Utc>) -> Self {
        Self { end: Some(end) }
    }

    fn seed(symbol: &str, timeframe: Timeframe) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(timeframe.label().as_bytes());
        *hasher.finalize().as_bytes()
    }

    fn generate(symbol: &str, timeframe: Timeframe, lookback: Lookback, end: DateTime<Utc>) -> Vec<Bar> {
        let mut rng = StdRng::from_seed(Self::seed(symbol, timeframe));
        let width = timeframe.seconds();
        let end_ts = end.timestamp() - end.timestamp().rem_euclid(width);
        let start_ts = end_ts - lookback.duration().num_seconds();
        let step_scale = match timeframe {
            Timeframe::Daily => 0.03,
            Timeframe::FourHour => 0.012,
        };

        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut ts = start_ts - start_ts.rem_euclid(width) + width;

        while ts <= end_ts {
            let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
                break;
            };
            ts += width;
            if matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let step: f64 = rng.gen_range(-step_scale..step_scale);
            let open = price;
            let close = price * (1.0 + step);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }

        bars
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        lookback: Lookback,
        timeframe: Timeframe,
    ) -> Result<BarSeries, DataError> {
        let end = self.end.unwrap_or_else(Utc::now);
        let bars = Self::generate(symbol, timeframe, lookback, end);
        Ok(BarSeries::from_unordered(symbol, timeframe, bars))
    }
}
