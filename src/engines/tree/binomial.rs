//! Module `engines::tree::binomial`.
//!
//! Cox-Ross-Rubinstein binomial lattice for European and American vanilla
//! options under a continuous dividend yield.
//!
//! References: Hull (11th ed.) Ch. 13, Cox-Ross-Rubinstein (1979).
//!
//! The lattice uses `u = exp(sigma sqrt(dt))`, `d = 1/u`. Delta and gamma are read
//! from the step-1 and step-2 nodes of the same backward induction, so no second
//! tree is built.
use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, PriceResult, PricingEngine, PricingError, PricingMethod};
use crate::instruments::OptionSpec;
use crate::market::MarketModel;

/// Minimum step count: Greeks need the step-2 nodes.
pub const MIN_TREE_STEPS: usize = 2;

/// Up-move probability of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeParameterization {
    /// `p = 1/2 + 1/2 (r - q - sigma^2/2) dt / (sigma sqrt(dt))`, matching the
    /// drift of `ln S` to first order.
    #[default]
    LogDrift,
    /// `p = (exp((r - q) dt) - d) / (u - d)`, matching the drift of `S` exactly.
    Textbook,
}

impl TreeParameterization {
    fn up_probability(self, rate: f64, dividend_yield: f64, vol: f64, dt: f64) -> f64 {
        match self {
            Self::LogDrift => {
                let dx = vol * dt.sqrt();
                0.5 + 0.5 * (rate - dividend_yield - 0.5 * vol * vol) * dt / dx
            }
            Self::Textbook => {
                let u = (vol * dt.sqrt()).exp();
                let d = 1.0 / u;
                (((rate - dividend_yield) * dt).exp() - d) / (u - d)
            }
        }
    }
}

/// Cox-Ross-Rubinstein binomial tree engine.
#[derive(Debug, Clone, Copy)]
pub struct BinomialTreeEngine {
    /// Number of tree steps.
    pub steps: usize,
    pub parameterization: TreeParameterization,
}

impl BinomialTreeEngine {
    /// Creates a tree engine with the given number of steps.
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            parameterization: TreeParameterization::default(),
        }
    }

    pub fn with_parameterization(mut self, parameterization: TreeParameterization) -> Self {
        self.parameterization = parameterization;
        self
    }
}

impl PricingEngine for BinomialTreeEngine {
    fn method(&self) -> PricingMethod {
        PricingMethod::Binomial
    }

    fn price(
        &self,
        market: &MarketModel,
        option: &OptionSpec,
        exercise: ExerciseStyle,
    ) -> Result<PriceResult, PricingError> {
        if self.steps < MIN_TREE_STEPS {
            return Err(PricingError::InvalidResolution {
                steps: self.steps,
                minimum: MIN_TREE_STEPS,
            });
        }
        if market.dividends().is_discrete() {
            return Err(PricingError::invalid_input(
                "BinomialTreeEngine does not support discrete cash dividends",
            ));
        }

        let spot = PricingError::require_positive("spot", market.spot())?;
        let vol = PricingError::require_positive("volatility", market.vol())?;
        let expiry = PricingError::require_positive("time_to_maturity", market.expiry())?;
        let strike = option.strike;
        let option_type = option.option_type;
        let rate = market.rate();

        let steps = self.steps;
        let dt = expiry / steps as f64;
        let u = (vol * dt.sqrt()).exp();
        let d = 1.0 / u;
        let p = self
            .parameterization
            .up_probability(rate, market.dividend_yield(), vol, dt);
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(PricingError::numerical(format!(
                "risk-neutral probability {p} is outside [0, 1]"
            )));
        }
        let disc = (-rate * dt).exp();
        let is_american = exercise.is_american();

        // spot * u^j * d^(n-j) = spot * d^n * (u/d)^j
        let ratio = u / d;
        let disc_p = disc * p;
        let disc_1mp = disc * (1.0 - p);

        let mut values = vec![0.0_f64; steps + 1];
        {
            let mut st = spot * d.powi(steps as i32);
            for value in values.iter_mut() {
                *value = option_type.intrinsic(st, strike);
                st *= ratio;
            }
        }

        let mut step2 = [0.0_f64; 3];
        let mut step1 = [0.0_f64; 2];
        let mut base = spot * d.powi((steps - 1) as i32);
        for i in (0..steps).rev() {
            if is_american {
                let mut st = base;
                for j in 0..=i {
                    let continuation = disc_p.mul_add(values[j + 1], disc_1mp * values[j]);
                    values[j] = continuation.max(option_type.intrinsic(st, strike));
                    st *= ratio;
                }
            } else {
                for j in 0..=i {
                    values[j] = disc_p.mul_add(values[j + 1], disc_1mp * values[j]);
                }
            }
            match i {
                2 => step2.copy_from_slice(&values[..3]),
                1 => step1.copy_from_slice(&values[..2]),
                _ => {}
            }
            base *= u;
        }

        let (s1d, s1u) = (spot * d, spot * u);
        let delta = (step1[1] - step1[0]) / (s1u - s1d);
        let (s2d, s2m, s2u) = (spot * d * d, spot, spot * u * u);
        let delta_up = (step2[2] - step2[1]) / (s2u - s2m);
        let delta_dn = (step2[1] - step2[0]) / (s2m - s2d);
        let gamma = (delta_up - delta_dn) / (0.5 * (s2u - s2d));

        PriceResult {
            exercise,
            method: self.method(),
            npv: values[0],
            delta,
            gamma,
        }
        .checked()
    }
}
