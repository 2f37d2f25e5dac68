//! CSV directory provider for offline runs.
//!
//! Each series lives in `<dir>/<SYMBOL>_<1d|4h>.csv` with the header
//! `timestamp,open,high,low,close,volume` and RFC 3339 timestamps.

use super::provider::{DataError, DataProvider, Lookback};
use crate::domain::{Bar, BarSeries, Timeframe};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Reads bar series from a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(format!("{symbol}_{}.csv", timeframe.label()))
    }

    fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;
        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                row.map(Bar::from)
                    .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))
            })
            .collect()
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        lookback: Lookback,
        timeframe: Timeframe,
    ) -> Result<BarSeries, DataError> {
        let path = self.path_for(symbol, timeframe);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut bars = Self::read_bars(&path)?;
        if let Some(newest) = bars.iter().map(|b| b.timestamp).max() {
            let cutoff = newest - lookback.duration();
            bars.retain(|b| b.timestamp >= cutoff);
        }

        Ok(BarSeries::from_unordered(symbol, timeframe, bars))
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "timestamp,open,high,low,close,volume\n";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), format!("{HEADER}{body}")).unwrap();
    }

    #[test]
    fn reads_sorted_series_within_lookback() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "EREGL.IS_1d.csv",
            "2024-01-10T00:00:00Z,30,31,29,30.5,1000\n\
             2024-01-01T00:00:00Z,28,29,27,28.5,900\n\
             2024-01-09T00:00:00Z,29,30,28,29.5,1100\n",
        );

        let provider = CsvProvider::new(tmp.path());
        let series = provider
            .fetch("EREGL.IS", Lookback::days(3), Timeframe::Daily)
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![29.5, 30.5]);
        assert_eq!(series.timeframe(), Timeframe::Daily);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(tmp.path());
        let err = provider
            .fetch("SISE.IS", Lookback::days(30), Timeframe::FourHour)
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn malformed_row_is_csv_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "KCHOL.IS_4h.csv", "not-a-date,1,2,0.5,1.5,10\n");
        let provider = CsvProvider::new(tmp.path());
        let err = provider
            .fetch("KCHOL.IS", Lookback::days(30), Timeframe::FourHour)
            .unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }

    #[test]
    fn path_layout() {
        let provider = CsvProvider::new("/data");
        assert_eq!(
            provider.path_for("AKBNK.IS", Timeframe::FourHour),
            PathBuf::from("/data/AKBNK.IS_4h.csv")
        );
    }
}
