//! Canonical plain-vanilla equity option request.
//!
//! [`OptionSpec`] carries the contract terms (side, strike, maturity date) together
//! with the market inputs the caller supplies (spot, rate, optional volatility,
//! dividends) and the lattice/grid resolution. It is never mutated by the pricer;
//! every pricing call derives its own [`crate::market::MarketModel`] from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{OptionType, PricingError};
use crate::market::DividendSpec;

/// Default lattice/grid resolution.
pub const DEFAULT_STEPS: usize = 200;

/// Single-name equity option request.
///
/// Both European and American exercise are valued for every request.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use equity_pricer::core::OptionType;
/// use equity_pricer::instruments::OptionSpec;
///
/// let spec = OptionSpec::builder("IBM", OptionType::Call)
///     .strike(130.0)
///     .maturity(NaiveDate::from_ymd_opt(2016, 1, 15).unwrap())
///     .spot(127.62)
///     .risk_free_rate(0.001)
///     .volatility(0.20)
///     .dividend_yield(0.0163)
///     .build()
///     .unwrap();
/// assert_eq!(spec.steps, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Underlying identifier, used to look up historical prices.
    pub underlying: String,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike level.
    pub strike: f64,
    /// Maturity date.
    pub maturity: NaiveDate,
    /// Continuously compounded risk-free rate (may be negative).
    pub risk_free_rate: f64,
    /// Spot price on the calculation date.
    pub spot: f64,
    /// Annualized volatility; estimated from history when absent.
    pub volatility: Option<f64>,
    /// Dividend specification.
    #[serde(default)]
    pub dividends: DividendSpec,
    /// Tree steps / grid time steps.
    #[serde(default = "default_steps")]
    pub steps: usize,
}

fn default_steps() -> usize {
    DEFAULT_STEPS
}

impl OptionSpec {
    /// Starts a builder for `underlying` with the given option side.
    pub fn builder(underlying: impl Into<String>, option_type: OptionType) -> OptionSpecBuilder {
        OptionSpecBuilder::new(underlying.into(), option_type)
    }

    /// Validates contract and market fields that do not depend on a calculation date.
    ///
    /// # Errors
    /// - [`PricingError::DegenerateInput`] for non-positive strike/spot/volatility,
    ///   a negative dividend yield, or a non-finite rate.
    /// - [`PricingError::InvalidDividendSchedule`] for negative cash amounts.
    pub fn validate(&self) -> Result<(), PricingError> {
        PricingError::require_positive("strike", self.strike)?;
        PricingError::require_positive("spot", self.spot)?;
        if !self.risk_free_rate.is_finite() {
            return Err(PricingError::DegenerateInput {
                field: "risk_free_rate",
                value: self.risk_free_rate,
            });
        }
        if let Some(vol) = self.volatility {
            PricingError::require_positive("volatility", vol)?;
        }
        match &self.dividends {
            DividendSpec::ContinuousYield(q) if !q.is_finite() || *q < 0.0 => {
                Err(PricingError::DegenerateInput {
                    field: "dividend_yield",
                    value: *q,
                })
            }
            DividendSpec::Discrete(schedule) => {
                if schedule
                    .dividends()
                    .iter()
                    .any(|d| !d.amount.is_finite() || d.amount < 0.0)
                {
                    return Err(PricingError::invalid_dividends(
                        "cash dividend amounts must be finite and >= 0",
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Builder for [`OptionSpec`].
///
/// Dividend inputs are accumulated as a yield and parallel date/amount lists and
/// resolved once in [`OptionSpecBuilder::build`].
#[derive(Debug, Clone)]
pub struct OptionSpecBuilder {
    underlying: String,
    option_type: OptionType,
    strike: Option<f64>,
    maturity: Option<NaiveDate>,
    risk_free_rate: f64,
    spot: Option<f64>,
    volatility: Option<f64>,
    dividend_yield: Option<f64>,
    dividend_dates: Vec<NaiveDate>,
    dividend_amounts: Vec<f64>,
    steps: usize,
}

impl OptionSpecBuilder {
    fn new(underlying: String, option_type: OptionType) -> Self {
        Self {
            underlying,
            option_type,
            strike: None,
            maturity: None,
            risk_free_rate: 0.0,
            spot: None,
            volatility: None,
            dividend_yield: None,
            dividend_dates: Vec::new(),
            dividend_amounts: Vec::new(),
            steps: DEFAULT_STEPS,
        }
    }

    #[inline]
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    #[inline]
    pub fn maturity(mut self, maturity: NaiveDate) -> Self {
        self.maturity = Some(maturity);
        self
    }

    #[inline]
    pub fn risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    #[inline]
    pub fn volatility(mut self, vol: f64) -> Self {
        self.volatility = Some(vol);
        self
    }

    /// Sets a continuous dividend yield.
    #[inline]
    pub fn dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = Some(dividend_yield);
        self
    }

    /// Appends a cash dividend.
    pub fn cash_dividend(mut self, ex_date: NaiveDate, amount: f64) -> Self {
        self.dividend_dates.push(ex_date);
        self.dividend_amounts.push(amount);
        self
    }

    /// Replaces the cash schedule with parallel date and amount lists.
    pub fn dividend_schedule(mut self, dates: Vec<NaiveDate>, amounts: Vec<f64>) -> Self {
        self.dividend_dates = dates;
        self.dividend_amounts = amounts;
        self
    }

    #[inline]
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Validates and builds an [`OptionSpec`].
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when strike, maturity, or spot is
    /// missing, plus every error of [`DividendSpec::from_parts`] and
    /// [`OptionSpec::validate`].
    pub fn build(self) -> Result<OptionSpec, PricingError> {
        let strike = self
            .strike
            .ok_or_else(|| PricingError::invalid_input("option strike is required"))?;
        let maturity = self
            .maturity
            .ok_or_else(|| PricingError::invalid_input("option maturity is required"))?;
        let spot = self
            .spot
            .ok_or_else(|| PricingError::invalid_input("spot price is required"))?;
        let dividends = DividendSpec::from_parts(
            self.dividend_yield,
            &self.dividend_dates,
            &self.dividend_amounts,
        )?;

        let spec = OptionSpec {
            underlying: self.underlying,
            option_type: self.option_type,
            strike,
            maturity,
            risk_free_rate: self.risk_free_rate,
            spot,
            volatility: self.volatility,
            dividends,
            steps: self.steps,
        };
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maturity() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 1, 15).unwrap()
    }

    fn base() -> OptionSpecBuilder {
        OptionSpec::builder("DUMMY", OptionType::Call)
            .strike(130.0)
            .maturity(maturity())
            .spot(127.62)
            .risk_free_rate(0.001)
    }

    #[test]
    fn defaults_are_no_dividends_and_200_steps() {
        let spec = base().build().unwrap();
        assert_eq!(spec.dividends, DividendSpec::None);
        assert_eq!(spec.steps, DEFAULT_STEPS);
        assert_eq!(spec.volatility, None);
    }

    #[test]
    fn builders_do_not_share_dividend_lists() {
        let ex = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap();
        let with_div = base().cash_dividend(ex, 0.5).build().unwrap();
        let without = base().build().unwrap();
        assert!(with_div.dividends.has_discrete_dividends());
        assert!(!without.dividends.has_discrete_dividends());
    }

    #[test]
    fn yield_and_cash_schedule_together_is_configuration_error() {
        let ex = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap();
        let err = base()
            .dividend_yield(0.01)
            .cash_dividend(ex, 0.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, PricingError::Configuration(_)));
    }

    #[test]
    fn non_positive_inputs_are_degenerate() {
        let err = base().strike(0.0).build().unwrap_err();
        assert_eq!(
            err,
            PricingError::DegenerateInput {
                field: "strike",
                value: 0.0
            }
        );
        assert!(base().spot(-1.0).build().is_err());
        assert!(base().volatility(0.0).build().is_err());
        assert!(base().dividend_yield(-0.01).build().is_err());
    }

    #[test]
    fn negative_rate_is_allowed() {
        assert!(base().risk_free_rate(-0.005).build().is_ok());
    }

    #[test]
    fn missing_terms_are_reported() {
        let err = OptionSpec::builder("X", OptionType::Put)
            .spot(10.0)
            .maturity(maturity())
            .build()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));
    }
}
