//! Intraday resampling into coarser UTC-aligned buckets.

use crate::domain::{Bar, Timeframe};

/// Aggregate finer bars into `timeframe` buckets.
///
/// Buckets start at UTC multiples of the timeframe length. Open is the first
/// open in the bucket, close the last close, high/low the extremes, volume the
/// sum. Void bars are dropped before bucketing. Input must be ascending.
pub fn resample(bars: &[Bar], timeframe: Timeframe) -> Vec<Bar> {
    let width = timeframe.seconds();
    let mut out: Vec<Bar> = Vec::new();

    for bar in bars.iter().filter(|b| !b.is_void()) {
        let ts = bar.timestamp.timestamp();
        let bucket = ts - ts.rem_euclid(width);

        match out.last_mut() {
            Some(acc) if acc.timestamp.timestamp() == bucket => {
                acc.high = acc.high.max(bar.high);
                acc.low = acc.low.min(bar.low);
                acc.close = bar.close;
                acc.volume += bar.volume;
            }
            _ => {
                let Some(start) = chrono::DateTime::from_timestamp(bucket, 0) else {
                    continue;
                };
                out.push(Bar {
                    timestamp: start,
                    ..bar.clone()
                });
            }
        }
    }

    out
}
