//! Module `vol::historical`.
//!
//! Close-to-close historical volatility over a trailing calendar window.
//!
//! For calculation date `t`, observations dated in `[t - lookback_days, t]` are
//! sorted newest first and turned into daily log returns
//! `r_i = ln(P_i / P_{i+1})`. The estimate is the population standard deviation
//! of those returns scaled by `sqrt(periods_per_year)`.

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::core::PricingError;
use crate::data::{HistoricalPriceSeries, HistoricalPriceSource, PriceObservation};
use crate::math::realized_vol_close_to_close;

/// Default trailing window in calendar days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 92;
/// Default annualization factor (trading days per year).
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Fewer returns than this still produce an estimate, with a warning.
const THIN_WINDOW_RETURNS: usize = 20;

/// Historical volatility estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalVolatility {
    pub lookback_days: i64,
    pub periods_per_year: f64,
}

impl Default for HistoricalVolatility {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
        }
    }
}

impl HistoricalVolatility {
    pub fn new(lookback_days: i64, periods_per_year: f64) -> Self {
        Self {
            lookback_days,
            periods_per_year,
        }
    }

    /// First date of the trailing window ending at `calc_date`.
    #[inline]
    pub fn window_start(&self, calc_date: NaiveDate) -> NaiveDate {
        calc_date - Duration::days(self.lookback_days)
    }

    /// Estimates annualized volatility from `series` as of `calc_date`.
    ///
    /// Observations outside the window are ignored; input order does not matter.
    ///
    /// # Errors
    /// - [`PricingError::InsufficientData`] with fewer than 2 observations in the window.
    /// - [`PricingError::DataUnavailable`] for non-finite or non-positive prices.
    /// - [`PricingError::Configuration`] for a negative lookback or non-positive
    ///   annualization factor.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use equity_pricer::data::HistoricalPriceSeries;
    /// use equity_pricer::vol::HistoricalVolatility;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2015, 5, day).unwrap();
    /// let series = HistoricalPriceSeries::from_pairs(
    ///     "IBM",
    ///     [(d(4), 100.0), (d(5), 101.0), (d(6), 100.0), (d(7), 101.0)],
    /// );
    /// let vol = HistoricalVolatility::default().estimate(&series, d(8)).unwrap();
    /// assert!(vol > 0.0);
    /// ```
    pub fn estimate(
        &self,
        series: &HistoricalPriceSeries,
        calc_date: NaiveDate,
    ) -> Result<f64, PricingError> {
        self.validate()?;
        let window = series.window(self.window_start(calc_date), calc_date);

        let mut observations: Vec<PriceObservation> = window.observations().to_vec();
        if observations.len() < 2 {
            return Err(PricingError::InsufficientData(format!(
                "{} observation(s) of `{}` in the {}-day window ending {calc_date}",
                observations.len(),
                series.ticker(),
                self.lookback_days
            )));
        }
        if let Some(bad) = observations
            .iter()
            .find(|o| !o.adj_close.is_finite() || o.adj_close <= 0.0)
        {
            return Err(PricingError::DataUnavailable(format!(
                "unusable adjusted close {} for `{}` on {}",
                bad.adj_close,
                series.ticker(),
                bad.date
            )));
        }

        // newest first
        observations.sort_by(|a, b| b.date.cmp(&a.date));
        let closes: Vec<f64> = observations.iter().map(|o| o.adj_close).collect();

        let returns = closes.len() - 1;
        if returns < THIN_WINDOW_RETURNS {
            warn!(ticker = series.ticker(), returns, "thin volatility window");
        }

        let vol = realized_vol_close_to_close(&closes, self.periods_per_year)?;
        info!(
            ticker = series.ticker(),
            %calc_date,
            observations = observations.len(),
            vol,
            "historical volatility estimated"
        );
        Ok(vol)
    }

    /// Fetches the trailing window of `ticker` from `source` and estimates volatility.
    ///
    /// # Errors
    /// Collaborator failures map to [`PricingError::DataUnavailable`]; otherwise as
    /// [`HistoricalVolatility::estimate`].
    pub fn estimate_from_source(
        &self,
        source: &dyn HistoricalPriceSource,
        ticker: &str,
        calc_date: NaiveDate,
    ) -> Result<f64, PricingError> {
        self.validate()?;
        let series = source.fetch(ticker, self.window_start(calc_date), calc_date)?;
        self.estimate(&series, calc_date)
    }

    /// Checks the window length and annualization factor.
    ///
    /// # Errors
    /// [`PricingError::Configuration`] for a negative lookback or a non-positive
    /// annualization factor.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.lookback_days < 0 {
            return Err(PricingError::configuration(format!(
                "lookback_days must be >= 0, got {}",
                self.lookback_days
            )));
        }
        if !(self.periods_per_year.is_finite() && self.periods_per_year > 0.0) {
            return Err(PricingError::configuration(format!(
                "periods_per_year must be > 0, got {}",
                self.periods_per_year
            )));
        }
        Ok(())
    }
}
