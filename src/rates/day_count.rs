//! Module `rates::day_count`.
//!
//! Calendar dates to year fractions under Actual/365 Fixed. No business-day or
//! holiday adjustment is applied: every calendar day counts.
use chrono::NaiveDate;

use crate::core::PricingError;

/// Days per year under Actual/365 Fixed.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Computes the Actual/365 Fixed year fraction between two dates.
///
/// Edge cases:
/// - If `start == end`, returns `0.0`.
/// - If `start > end`, the result is negative and antisymmetric.
///
/// # Examples
/// ```rust
/// use chrono::NaiveDate;
/// use equity_pricer::rates::year_fraction;
///
/// let s = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let e = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// assert_eq!(year_fraction(s, e), 1.0);
/// assert_eq!(year_fraction(s, e), -year_fraction(e, s));
/// ```
pub fn year_fraction(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Year fraction for callers that require `start <= end`.
///
/// # Errors
/// Returns [`PricingError::InvalidDateRange`] when `end` precedes `start`.
pub fn checked_year_fraction(start: NaiveDate, end: NaiveDate) -> Result<f64, PricingError> {
    if end < start {
        return Err(PricingError::InvalidDateRange { start, end });
    }
    Ok(year_fraction(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_actual_days_over_365() {
        assert_eq!(
            year_fraction(date(2015, 5, 8), date(2016, 1, 15)),
            252.0 / 365.0
        );
        assert_eq!(year_fraction(date(2018, 6, 14), date(2018, 7, 20)), 36.0 / 365.0);
    }

    #[test]
    fn leap_years_are_not_special() {
        let yf = year_fraction(date(2024, 1, 1), date(2025, 1, 1));
        assert_eq!(yf, 366.0 / 365.0);
    }

    #[test]
    fn checked_rejects_reversed_range() {
        let err = checked_year_fraction(date(2020, 2, 1), date(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, PricingError::InvalidDateRange { .. }));
        assert_eq!(checked_year_fraction(date(2020, 1, 1), date(2020, 1, 1)), Ok(0.0));
    }
}
