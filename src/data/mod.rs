//! Market-data collaborators supplying historical adjusted closes.
//!
//! The pricing core depends only on [`HistoricalPriceSource`]; concrete sources
//! are injected by the caller.

pub mod csv_source;
#[cfg(feature = "http")]
pub mod quandl;
pub mod series;
pub mod source;

pub use csv_source::CsvPriceSource;
#[cfg(feature = "http")]
pub use quandl::{QuandlConfig, QuandlPriceSource};
pub use series::{HistoricalPriceSeries, PriceObservation};
pub use source::{DataError, HistoricalPriceSource, InMemoryPriceSource};
