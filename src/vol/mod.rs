//! Module `vol::mod`.
//!
//! Volatility estimation from historical prices.
pub mod historical;

pub use historical::{DEFAULT_LOOKBACK_DAYS, DEFAULT_PERIODS_PER_YEAR, HistoricalVolatility};
