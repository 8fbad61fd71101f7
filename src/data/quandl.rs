//! Module `data::quandl`.
//!
//! Blocking client for the Quandl datatables API (`WIKI/PRICES`).
//!
//! Credentials and the endpoint are injected through [`QuandlConfig`]; nothing is
//! read from or written to process-global state.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::data::{DataError, HistoricalPriceSeries, HistoricalPriceSource, PriceObservation};

pub const DEFAULT_BASE_URL: &str = "https://www.quandl.com/api/v3/datatables/WIKI/PRICES.json";

/// Connection settings for [`QuandlPriceSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuandlConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl QuandlConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Historical adjusted closes fetched over HTTP.
#[derive(Debug, Clone)]
pub struct QuandlPriceSource {
    config: QuandlConfig,
    client: Client,
}

impl QuandlPriceSource {
    pub fn new(config: QuandlConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("equity-pricer/0.1")
            .build()?;
        Ok(Self { config, client })
    }

    fn query(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("ticker", ticker.to_string()),
            ("date.gte", start.format("%Y-%m-%d").to_string()),
            ("date.lte", end.format("%Y-%m-%d").to_string()),
            ("qopts.columns", "ticker,date,adj_close".to_string()),
            ("api_key", self.config.api_key.clone()),
        ]
    }
}

impl HistoricalPriceSource for QuandlPriceSource {
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalPriceSeries, DataError> {
        debug!(ticker, %start, %end, "requesting price history");
        let body: Value = self
            .client
            .get(&self.config.base_url)
            .query(&self.query(ticker, start, end))
            .send()?
            .error_for_status()?
            .json()?;
        let series = parse_datatable(ticker, &body)?;
        if series.is_empty() {
            return Err(DataError::NoData {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }
        Ok(series)
    }
}

/// Parses a `datatable` response with columns `ticker,date,adj_close`.
fn parse_datatable(ticker: &str, body: &Value) -> Result<HistoricalPriceSeries, DataError> {
    let rows = body
        .get("datatable")
        .and_then(|t| t.get("data"))
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::Malformed("missing datatable.data".to_string()))?;

    let mut observations = Vec::with_capacity(rows.len());
    for row in rows {
        let fields = row
            .as_array()
            .ok_or_else(|| DataError::Malformed(format!("row is not an array: {row}")))?;
        let (Some(date), Some(adj_close)) = (
            fields.get(1).and_then(Value::as_str),
            fields.get(2).and_then(Value::as_f64),
        ) else {
            return Err(DataError::Malformed(format!("unexpected row layout: {row}")));
        };
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DataError::Malformed(format!("date `{date}`: {e}")))?;
        observations.push(PriceObservation { date, adj_close });
    }
    Ok(HistoricalPriceSeries::new(ticker, observations))
}
