//! Ordered bar series for one symbol and one timeframe.

use super::bar::Bar;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bar interval of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "4h")]
    FourHour,
}

impl Timeframe {
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Daily => "1d",
            Timeframe::FourHour => "4h",
        }
    }

    /// Length of one bar in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::Daily => 24 * 3600,
            Timeframe::FourHour => 4 * 3600,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("{symbol} {timeframe}: bar {index} is not after its predecessor")]
    OutOfOrder {
        symbol: String,
        timeframe: Timeframe,
        index: usize,
    },
}

/// Bars for one symbol and timeframe, strictly ascending by timestamp.
///
/// The ordering invariant is checked at construction; everything downstream
/// (indicators, rule evaluators) relies on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    symbol: String,
    timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if let Some(index) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(SeriesError::OutOfOrder {
                symbol,
                timeframe,
                index: index + 1,
            });
        }
        Ok(Self {
            symbol,
            timeframe,
            bars,
        })
    }

    /// Sort by timestamp and drop duplicate timestamps (keeping the later row).
    ///
    /// Provider payloads are not always clean; this is the lenient path into
    /// a valid series.
    pub fn from_unordered(symbol: impl Into<String>, timeframe: Timeframe, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The bar before the last one.
    pub fn previous(&self) -> Option<&Bar> {
        self.bars.len().checked_sub(2).map(|i| &self.bars[i])
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar_at(hours: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hours),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        }
    }

    #[test]
    fn accepts_ascending_bars() {
        let series =
            BarSeries::new("ASELS.IS", Timeframe::FourHour, vec![bar_at(0, 1.0), bar_at(4, 2.0)])
                .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.0, 2.0]);
        assert_eq!(series.previous().unwrap().close, 1.0);
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = BarSeries::new("X", Timeframe::Daily, vec![bar_at(0, 1.0), bar_at(0, 2.0)])
            .unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn from_unordered_sorts_and_dedups() {
        let series = BarSeries::from_unordered(
            "X",
            Timeframe::Daily,
            vec![bar_at(8, 3.0), bar_at(0, 1.0), bar_at(8, 4.0)],
        );
        assert_eq!(series.closes(), vec![1.0, 4.0]);
    }

    #[test]
    fn previous_of_single_bar_is_none() {
        let series = BarSeries::new("X", Timeframe::Daily, vec![bar_at(0, 1.0)]).unwrap();
        assert!(series.previous().is_none());
    }

    #[test]
    fn timeframe_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Timeframe::FourHour).unwrap(), "\"4h\"");
        assert_eq!(Timeframe::Daily.to_string(), "1d");
    }
}
