//! Return transforms and moment estimators for historical price series.
//!
//! All estimators sum in input order so that identical inputs give bit-identical
//! results across runs and platforms.

use crate::core::PricingError;

/// Computes log returns from a price series ordered newest first.
///
/// `r_i = ln(P_i / P_{i+1})`
///
/// # Errors
/// Returns [`PricingError::InsufficientData`] for fewer than 2 prices and
/// [`PricingError::InvalidInput`] if any price is non-finite or `<= 0`.
///
/// # Examples
/// ```
/// use equity_pricer::math::log_returns_newest_first;
///
/// let r = log_returns_newest_first(&[99.0, 110.0, 100.0]).unwrap();
/// assert_eq!(r.len(), 2);
/// assert!((r[1] - (1.1f64).ln()).abs() < 1e-15);
/// ```
pub fn log_returns_newest_first(prices: &[f64]) -> Result<Vec<f64>, PricingError> {
    validate_prices(prices)?;
    Ok(prices.windows(2).map(|w| (w[0] / w[1]).ln()).collect())
}

/// Arithmetic mean. Returns `NaN` for an empty slice.
pub fn sample_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `n`).
///
/// # Errors
/// Returns [`PricingError::InsufficientData`] for an empty slice.
pub fn population_std_dev(values: &[f64]) -> Result<f64, PricingError> {
    if values.is_empty() {
        return Err(PricingError::InsufficientData(
            "standard deviation of an empty sample".to_string(),
        ));
    }
    let mean = sample_mean(values);
    let mut sum = 0.0;
    for &x in values {
        let d = x - mean;
        sum += d * d;
    }
    Ok((sum / values.len() as f64).max(0.0).sqrt())
}

/// Annualized close-to-close volatility of closes ordered newest first:
/// population standard deviation of log returns scaled by `sqrt(periods_per_year)`.
///
/// # Errors
/// Propagates [`log_returns_newest_first`] errors and rejects a non-positive
/// `periods_per_year`.
pub fn realized_vol_close_to_close(
    closes_newest_first: &[f64],
    periods_per_year: f64,
) -> Result<f64, PricingError> {
    let periods_per_year = PricingError::require_positive("periods_per_year", periods_per_year)?;
    let returns = log_returns_newest_first(closes_newest_first)?;
    Ok(population_std_dev(&returns)? * periods_per_year.sqrt())
}

fn validate_prices(prices: &[f64]) -> Result<(), PricingError> {
    if prices.len() < 2 {
        return Err(PricingError::InsufficientData(format!(
            "{} price observation(s), at least 2 are required",
            prices.len()
        )));
    }
    if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(PricingError::invalid_input(format!(
            "prices must be finite and > 0, found {bad}"
        )));
    }
    Ok(())
}
