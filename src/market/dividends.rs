//! Module `market::dividends`.
//!
//! Dividend specifications for single-name equity options:
//! - no dividends,
//! - a continuously compounded yield,
//! - a dated schedule of cash dividends.
//!
//! A yield and a schedule are mutually exclusive. Cash dividends are modelled as
//! deterministic spot jumps `S+ = S- - D` on the ex-dividend date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::PricingError;
use crate::rates::year_fraction;

/// Cash dividend paid on an ex-dividend date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashDividend {
    /// Ex-dividend date.
    pub ex_date: NaiveDate,
    /// Cash amount subtracted from spot on the ex-date.
    pub amount: f64,
}

impl CashDividend {
    pub fn new(ex_date: NaiveDate, amount: f64) -> Self {
        Self { ex_date, amount }
    }
}

/// Dated cash-dividend schedule, sorted by ex-date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CashDividendSchedule {
    dividends: Vec<CashDividend>,
}

impl CashDividendSchedule {
    /// Builds a schedule and validates amounts.
    ///
    /// Entries are sorted by ex-date; several entries may share a date.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidDividendSchedule`] for negative or non-finite amounts.
    pub fn new(mut dividends: Vec<CashDividend>) -> Result<Self, PricingError> {
        dividends.sort_by_key(|d| d.ex_date);
        for dividend in &dividends {
            if !dividend.amount.is_finite() || dividend.amount < 0.0 {
                return Err(PricingError::invalid_dividends(format!(
                    "amount {} on {} must be finite and >= 0",
                    dividend.amount, dividend.ex_date
                )));
            }
        }
        Ok(Self { dividends })
    }

    /// Builds a schedule from parallel date and amount lists.
    ///
    /// # Errors
    /// Returns [`PricingError::Configuration`] when the lists differ in length.
    pub fn from_parallel(dates: &[NaiveDate], amounts: &[f64]) -> Result<Self, PricingError> {
        if dates.len() != amounts.len() {
            return Err(PricingError::configuration(format!(
                "{} dividend dates but {} dividend amounts",
                dates.len(),
                amounts.len()
            )));
        }
        Self::new(
            dates
                .iter()
                .zip(amounts)
                .map(|(&ex_date, &amount)| CashDividend { ex_date, amount })
                .collect(),
        )
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dividends.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dividends.len()
    }

    #[inline]
    pub fn dividends(&self) -> &[CashDividend] {
        &self.dividends
    }

    /// Checks that every ex-date lies in `(calc_date, maturity]`.
    pub fn validate_window(
        &self,
        calc_date: NaiveDate,
        maturity: NaiveDate,
    ) -> Result<(), PricingError> {
        for dividend in &self.dividends {
            if dividend.ex_date <= calc_date || dividend.ex_date > maturity {
                return Err(PricingError::invalid_dividends(format!(
                    "ex-date {} lies outside ({calc_date}, {maturity}]",
                    dividend.ex_date
                )));
            }
        }
        Ok(())
    }

    /// Converts ex-dates into Act/365F times measured from `calc_date`.
    pub fn events_from(&self, calc_date: NaiveDate) -> Vec<DividendEvent> {
        self.dividends
            .iter()
            .map(|d| DividendEvent {
                time: year_fraction(calc_date, d.ex_date),
                amount: d.amount,
            })
            .collect()
    }
}

/// Dividend specification of an option request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendSpec {
    /// Non-dividend-paying underlying.
    #[default]
    None,
    /// Continuously compounded dividend yield.
    ContinuousYield(f64),
    /// Dated cash dividends.
    Discrete(CashDividendSchedule),
}

impl DividendSpec {
    /// Resolves a dividend specification from the raw request fields.
    ///
    /// An empty schedule together with a yield is treated as a yield; a yield
    /// together with any cash dividend is contradictory.
    ///
    /// # Errors
    /// Returns [`PricingError::Configuration`] when both a yield and a non-empty
    /// schedule are given or the schedule lists differ in length, and
    /// [`PricingError::InvalidDividendSchedule`] for bad amounts.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use equity_pricer::market::DividendSpec;
    ///
    /// let ex = NaiveDate::from_ymd_opt(2018, 6, 15).unwrap();
    /// assert!(DividendSpec::from_parts(Some(0.02), &[], &[]).is_ok());
    /// assert!(DividendSpec::from_parts(None, &[ex], &[0.12]).is_ok());
    /// assert!(DividendSpec::from_parts(Some(0.02), &[ex], &[0.12]).is_err());
    /// ```
    pub fn from_parts(
        dividend_yield: Option<f64>,
        dates: &[NaiveDate],
        amounts: &[f64],
    ) -> Result<Self, PricingError> {
        let schedule = CashDividendSchedule::from_parallel(dates, amounts)?;
        match (dividend_yield, schedule.is_empty()) {
            (Some(q), true) => Ok(Self::ContinuousYield(q)),
            (Some(_), false) => Err(PricingError::configuration(
                "continuous dividend yield and discrete dividend schedule are mutually exclusive",
            )),
            (None, true) => Ok(Self::None),
            (None, false) => Ok(Self::Discrete(schedule)),
        }
    }

    /// Returns `true` for a non-empty cash schedule.
    #[inline]
    pub fn has_discrete_dividends(&self) -> bool {
        matches!(self, Self::Discrete(schedule) if !schedule.is_empty())
    }
}

/// Cash dividend expressed in model time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividendEvent {
    /// Ex-dividend time in years from the calculation date.
    pub time: f64,
    /// Cash amount.
    pub amount: f64,
}

/// Dividend representation resolved against a calculation date.
#[derive(Debug, Clone, PartialEq)]
pub enum Dividends {
    None,
    Yield(f64),
    Cash(Vec<DividendEvent>),
}

impl Dividends {
    /// Continuous yield, zero for the other representations.
    #[inline]
    pub fn yield_rate(&self) -> f64 {
        match self {
            Self::Yield(q) => *q,
            _ => 0.0,
        }
    }

    /// Cash events, empty for the other representations.
    #[inline]
    pub fn cash_events(&self) -> &[DividendEvent] {
        match self {
            Self::Cash(events) => events,
            _ => &[],
        }
    }

    #[inline]
    pub fn is_discrete(&self) -> bool {
        !self.cash_events().is_empty()
    }

    /// Value at `time` of the cash dividends going ex strictly after `time`,
    /// discounted at `rate`.
    pub fn pv_after(&self, time: f64, rate: f64) -> f64 {
        self.cash_events()
            .iter()
            .filter(|ev| ev.time > time)
            .map(|ev| ev.amount * (-rate * (ev.time - time)).exp())
            .sum()
    }
}
