//! Engine abstraction and the result payload every engine returns.

use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, PricingError, PricingMethod};
use crate::instruments::OptionSpec;
use crate::market::MarketModel;

/// Pricing engine abstraction over a calibrated market model.
///
/// Engines are pure functions of their inputs: they allocate their own lattice
/// or grid buffers per call and never retain the result.
pub trait PricingEngine: std::fmt::Debug + Send + Sync {
    /// Method tag attached to every result.
    fn method(&self) -> PricingMethod;

    /// Prices `option` under `market` with the requested exercise rights.
    fn price(
        &self,
        market: &MarketModel,
        option: &OptionSpec,
        exercise: ExerciseStyle,
    ) -> Result<PriceResult, PricingError>;
}

/// Value and spot sensitivities of one valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    /// Exercise rights the value was computed for.
    pub exercise: ExerciseStyle,
    /// Engine that produced the value.
    pub method: PricingMethod,
    /// Present value.
    pub npv: f64,
    /// First derivative to spot.
    pub delta: f64,
    /// Second derivative to spot.
    pub gamma: f64,
}

impl PriceResult {
    pub(crate) fn checked(self) -> Result<Self, PricingError> {
        if self.npv.is_finite() && self.delta.is_finite() && self.gamma.is_finite() {
            Ok(self)
        } else {
            Err(PricingError::numerical(format!(
                "{} engine produced a non-finite result (npv={}, delta={}, gamma={})",
                self.method, self.npv, self.delta, self.gamma
            )))
        }
    }
}
