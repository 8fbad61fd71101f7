use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::PricingError;

/// Plain-vanilla option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call option payoff profile.
    Call,
    /// Put option payoff profile.
    Put,
}

impl OptionType {
    /// Immediate-exercise value at `spot`.
    #[inline]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => f.write_str("call"),
            Self::Put => f.write_str("put"),
        }
    }
}

/// Accepts `call`/`c` and `put`/`p` in any letter case.
///
/// # Examples
/// ```
/// use equity_pricer::core::OptionType;
///
/// assert_eq!("Call".parse::<OptionType>().unwrap(), OptionType::Call);
/// assert_eq!("p".parse::<OptionType>().unwrap(), OptionType::Put);
/// assert!("straddle".parse::<OptionType>().is_err());
/// ```
impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            _ => Err(PricingError::InvalidPayoff(raw.to_string())),
        }
    }
}

/// Exercise rights for an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStyle {
    /// Exercise only at expiry.
    European,
    /// Exercise at any time from the calculation date up to expiry.
    American,
}

impl ExerciseStyle {
    #[inline]
    pub fn is_american(self) -> bool {
        matches!(self, Self::American)
    }
}

impl fmt::Display for ExerciseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::European => f.write_str("european"),
            Self::American => f.write_str("american"),
        }
    }
}

/// Numerical method that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMethod {
    /// Closed-form Black-Scholes-Merton.
    Analytic,
    /// Cox-Ross-Rubinstein recombining tree.
    Binomial,
    /// Crank-Nicolson finite differences with cash-dividend jumps.
    FiniteDifference,
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analytic => f.write_str("analytic"),
            Self::Binomial => f.write_str("binomial"),
            Self::FiniteDifference => f.write_str("finite_difference"),
        }
    }
}
