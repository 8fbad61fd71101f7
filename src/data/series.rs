//! Module `data::series`.
//!
//! Dated adjusted-close observations for one underlying.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One adjusted-close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub adj_close: f64,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, adj_close: f64) -> Self {
        Self { date, adj_close }
    }
}

/// Read-only series of adjusted closes.
///
/// Observations are kept in the order supplied; consumers that need a specific
/// ordering sort a copy themselves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoricalPriceSeries {
    ticker: String,
    observations: Vec<PriceObservation>,
}

impl HistoricalPriceSeries {
    pub fn new(ticker: impl Into<String>, observations: Vec<PriceObservation>) -> Self {
        Self {
            ticker: ticker.into(),
            observations,
        }
    }

    /// Builds a series from `(date, adj_close)` pairs.
    pub fn from_pairs<I>(ticker: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            ticker,
            pairs
                .into_iter()
                .map(|(date, adj_close)| PriceObservation { date, adj_close })
                .collect(),
        )
    }

    #[inline]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[inline]
    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations with `start <= date <= end`, in the original order.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: self.ticker.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| o.date >= start && o.date <= end)
                .copied()
                .collect(),
        }
    }
}
