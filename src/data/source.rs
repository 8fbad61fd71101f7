//! Module `data::source`.
//!
//! Historical price collaborator interface and an in-memory implementation.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::PricingError;
use crate::data::{HistoricalPriceSeries, PriceObservation};

/// Failure reported by a [`HistoricalPriceSource`].
#[derive(Error, Debug)]
pub enum DataError {
    #[error("no price history for `{ticker}` between {start} and {end}")]
    NoData {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "http")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DataError> for PricingError {
    fn from(err: DataError) -> Self {
        PricingError::DataUnavailable(err.to_string())
    }
}

/// Source of dated adjusted closes for an underlying.
///
/// Implementations fetch synchronously; an empty result for the requested window
/// is reported as [`DataError::NoData`].
pub trait HistoricalPriceSource: Send + Sync {
    /// Returns observations of `ticker` with `start <= date <= end`.
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalPriceSeries, DataError>;
}

/// Price history held in memory, keyed by ticker.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    series: HashMap<String, Vec<PriceObservation>>,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the history of one ticker.
    pub fn with_series(mut self, series: HistoricalPriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: HistoricalPriceSeries) {
        self.series
            .insert(series.ticker().to_string(), series.observations().to_vec());
    }

    /// Appends one observation to a ticker's history.
    pub fn push(&mut self, ticker: &str, date: NaiveDate, adj_close: f64) {
        self.series
            .entry(ticker.to_string())
            .or_default()
            .push(PriceObservation { date, adj_close });
    }
}

impl HistoricalPriceSource for InMemoryPriceSource {
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalPriceSeries, DataError> {
        let window = self
            .series
            .get(ticker)
            .map(|obs| HistoricalPriceSeries::new(ticker, obs.clone()).window(start, end))
            .unwrap_or_default();
        if window.is_empty() {
            return Err(DataError::NoData {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }
        Ok(window)
    }
}
