//! Domain types for bistscan

pub mod bar;
pub mod series;
pub mod signal;

pub use bar::Bar;
pub use series::{BarSeries, SeriesError, Timeframe};
pub use signal::{Signal, Strength, SymbolSnapshot};
