//! Module `data::csv_source`.
//!
//! CSV-backed price history with columns `ticker,date,adj_close`.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data::{DataError, HistoricalPriceSeries, HistoricalPriceSource, InMemoryPriceSource};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct CsvRow {
    ticker: String,
    date: String,
    adj_close: f64,
}

/// Price history loaded eagerly from a CSV table.
///
/// The table may hold several tickers. Dates use `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct CsvPriceSource {
    inner: InMemoryPriceSource,
}

impl CsvPriceSource {
    /// Loads a CSV file with a header row.
    ///
    /// # Errors
    /// Returns [`DataError`] for IO failures, malformed rows, or bad dates.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading price history");
        let reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Loads CSV content from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        Self::from_csv_reader(ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader))
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DataError> {
        let mut inner = InMemoryPriceSource::new();
        let mut rows = 0usize;
        for result in reader.deserialize() {
            let row: CsvRow = result?;
            let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|e| {
                DataError::Malformed(format!("date `{}` for {}: {e}", row.date, row.ticker))
            })?;
            inner.push(&row.ticker, date, row.adj_close);
            rows += 1;
        }
        if rows == 0 {
            warn!("price history CSV contained no rows");
        }
        Ok(Self { inner })
    }
}

impl HistoricalPriceSource for CsvPriceSource {
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalPriceSeries, DataError> {
        self.inner.fetch(ticker, start, end)
    }
}
