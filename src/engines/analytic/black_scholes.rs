//! Module `engines::analytic::black_scholes`.
//!
//! Closed-form Black-Scholes-Merton value, delta and gamma for European
//! options on an underlying with a continuous dividend yield.

use crate::core::{ExerciseStyle, OptionType, PriceResult, PricingEngine, PricingError, PricingMethod};
use crate::instruments::OptionSpec;
use crate::market::MarketModel;
use crate::math::{normal_cdf, normal_pdf};

/// Analytic Black-Scholes-Merton engine for European vanilla options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholesEngine;

impl BlackScholesEngine {
    pub fn new() -> Self {
        Self
    }
}

fn check_inputs(spot: f64, strike: f64, vol: f64, expiry: f64) -> Result<(), PricingError> {
    PricingError::require_positive("spot", spot)?;
    PricingError::require_positive("strike", strike)?;
    PricingError::require_positive("volatility", vol)?;
    PricingError::require_positive("time_to_maturity", expiry)?;
    Ok(())
}

#[inline]
fn d1_d2(
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> (f64, f64) {
    let sig_sqrt_t = vol * expiry.sqrt();
    let d1 =
        ((spot / strike).ln() + (rate - dividend_yield + 0.5 * vol * vol) * expiry) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// European option value.
///
/// # Errors
/// [`PricingError::DegenerateInput`] unless spot, strike, `vol` and `expiry` are
/// finite and strictly positive.
///
/// # Examples
/// ```
/// use equity_pricer::core::OptionType;
/// use equity_pricer::engines::analytic::bs_price;
///
/// let px = bs_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0).unwrap();
/// assert!((px - 10.450_583_572_185_565).abs() < 1e-12);
/// ```
pub fn bs_price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    check_inputs(spot, strike, vol, expiry)?;
    let df_r = (-rate * expiry).exp();
    let df_q = (-dividend_yield * expiry).exp();
    let (d1, d2) = d1_d2(spot, strike, rate, dividend_yield, vol, expiry);
    Ok(match option_type {
        OptionType::Call => spot * df_q * normal_cdf(d1) - strike * df_r * normal_cdf(d2),
        OptionType::Put => strike * df_r * normal_cdf(-d2) - spot * df_q * normal_cdf(-d1),
    })
}

/// European option delta.
pub fn bs_delta(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    check_inputs(spot, strike, vol, expiry)?;
    let (d1, _) = d1_d2(spot, strike, rate, dividend_yield, vol, expiry);
    let df_q = (-dividend_yield * expiry).exp();
    Ok(match option_type {
        OptionType::Call => df_q * normal_cdf(d1),
        OptionType::Put => df_q * (normal_cdf(d1) - 1.0),
    })
}

/// European option gamma (identical for calls and puts).
pub fn bs_gamma(
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    check_inputs(spot, strike, vol, expiry)?;
    let (d1, _) = d1_d2(spot, strike, rate, dividend_yield, vol, expiry);
    let df_q = (-dividend_yield * expiry).exp();
    Ok(df_q * normal_pdf(d1) / (spot * vol * expiry.sqrt()))
}

impl PricingEngine for BlackScholesEngine {
    fn method(&self) -> PricingMethod {
        PricingMethod::Analytic
    }

    fn price(
        &self,
        market: &MarketModel,
        option: &OptionSpec,
        exercise: ExerciseStyle,
    ) -> Result<PriceResult, PricingError> {
        if exercise.is_american() {
            return Err(PricingError::invalid_input(
                "BlackScholesEngine supports European exercise only",
            ));
        }
        if market.dividends().is_discrete() {
            return Err(PricingError::invalid_input(
                "BlackScholesEngine does not support discrete cash dividends",
            ));
        }

        let (s, k, r, q, v, t) = (
            market.spot(),
            option.strike,
            market.rate(),
            market.dividend_yield(),
            market.vol(),
            market.expiry(),
        );
        PriceResult {
            exercise,
            method: self.method(),
            npv: bs_price(option.option_type, s, k, r, q, v, t)?,
            delta: bs_delta(option.option_type, s, k, r, q, v, t)?,
            gamma: bs_gamma(s, k, r, q, v, t)?,
        }
        .checked()
    }
}
