//! Market data: provider trait and the Yahoo, CSV and synthetic sources.

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod resample;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{fetch_available, DataError, DataProvider, Lookback};
pub use resample::resample;
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
