//! Error taxonomy shared by every stage of a pricing call.

use chrono::NaiveDate;
use thiserror::Error;

/// Engine, model, and data errors surfaced by the API.
///
/// Every variant is terminal for the pricing call that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Ambiguous or contradictory configuration, e.g. a dividend yield together
    /// with a discrete schedule.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Option right is neither call nor put.
    #[error("invalid payoff: unrecognized option right `{0}`")]
    InvalidPayoff(String),

    /// A date range runs backwards where a non-negative span is required.
    #[error("invalid date range: {end} is before {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Non-positive or non-finite time, volatility, spot, or strike.
    #[error("degenerate input: {field} = {value}")]
    DegenerateInput { field: &'static str, value: f64 },

    /// Step count too small for the selected method.
    #[error("invalid resolution: {steps} steps given, method requires at least {minimum}")]
    InvalidResolution { steps: usize, minimum: usize },

    /// Out-of-range or negative dividend entries.
    #[error("invalid dividend schedule: {0}")]
    InvalidDividendSchedule(String),

    /// Too few observations to estimate historical volatility.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The market-data collaborator failed or returned unusable data.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// Request does not match the capabilities of an engine.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Numerical issue (invalid probability, singular system, non-finite result).
    #[error("numerical error: {0}")]
    NumericalError(String),
}

impl PricingError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_dividends(msg: impl Into<String>) -> Self {
        Self::InvalidDividendSchedule(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::NumericalError(msg.into())
    }

    /// Rejects values that are not finite and strictly positive.
    pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::DegenerateInput { field, value })
        }
    }
}
