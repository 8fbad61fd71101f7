//! Module `market::model`.
//!
//! Calibrated Black-Scholes-Merton market state for one pricing call.
//!
//! A [`MarketModel`] is derived from an [`OptionSpec`], a calculation date, and a
//! resolved volatility. It is immutable after construction and owned by a single
//! call; engines read it but never retain it.

use chrono::NaiveDate;

use crate::core::PricingError;
use crate::instruments::OptionSpec;
use crate::market::{DividendSpec, Dividends};
use crate::rates::checked_year_fraction;

/// Market snapshot used by all pricing engines.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketModel {
    calc_date: NaiveDate,
    maturity: NaiveDate,
    expiry: f64,
    spot: f64,
    rate: f64,
    vol: f64,
    dividends: Dividends,
}

impl MarketModel {
    /// Calibrates the market for `spec` as of `calc_date` with volatility `vol`.
    ///
    /// # Errors
    /// - [`PricingError::InvalidDateRange`] if `calc_date` is after maturity.
    /// - [`PricingError::DegenerateInput`] for zero time to maturity or a
    ///   non-positive spot, strike, or volatility.
    /// - [`PricingError::InvalidDividendSchedule`] if an ex-date lies outside
    ///   `(calc_date, maturity]`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use equity_pricer::core::OptionType;
    /// use equity_pricer::instruments::OptionSpec;
    /// use equity_pricer::market::MarketModel;
    ///
    /// let spec = OptionSpec::builder("DUMMY", OptionType::Call)
    ///     .strike(100.0)
    ///     .maturity(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
    ///     .spot(100.0)
    ///     .risk_free_rate(0.03)
    ///     .build()
    ///     .unwrap();
    /// let market = MarketModel::new(&spec, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 0.2).unwrap();
    /// assert_eq!(market.expiry(), 1.0);
    /// ```
    pub fn new(spec: &OptionSpec, calc_date: NaiveDate, vol: f64) -> Result<Self, PricingError> {
        spec.validate()?;
        let vol = PricingError::require_positive("volatility", vol)?;
        let expiry = checked_year_fraction(calc_date, spec.maturity)?;
        let expiry = PricingError::require_positive("time_to_maturity", expiry)?;

        let dividends = match &spec.dividends {
            DividendSpec::None => Dividends::None,
            DividendSpec::ContinuousYield(q) => Dividends::Yield(*q),
            DividendSpec::Discrete(schedule) if schedule.is_empty() => Dividends::None,
            DividendSpec::Discrete(schedule) => {
                schedule.validate_window(calc_date, spec.maturity)?;
                Dividends::Cash(schedule.events_from(calc_date))
            }
        };

        Ok(Self {
            calc_date,
            maturity: spec.maturity,
            expiry,
            spot: spec.spot,
            rate: spec.risk_free_rate,
            vol,
            dividends,
        })
    }

    #[inline]
    pub fn calc_date(&self) -> NaiveDate {
        self.calc_date
    }

    #[inline]
    pub fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    /// Time to maturity in years.
    #[inline]
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[inline]
    pub fn vol(&self) -> f64 {
        self.vol
    }

    /// Continuous dividend yield, zero unless the yield representation is used.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividends.yield_rate()
    }

    #[inline]
    pub fn dividends(&self) -> &Dividends {
        &self.dividends
    }
}
