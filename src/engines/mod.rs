//! Pricing engine implementations and the dispatch table that picks one per
//! exercise style and dividend representation.
//!
//! | dividends      | European          | American          |
//! |----------------|-------------------|-------------------|
//! | none / yield   | analytic BSM      | CRR binomial      |
//! | discrete cash  | finite difference | finite difference |

use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, PricingEngine};
use crate::market::Dividends;

pub mod analytic;
pub mod pde;
pub mod tree;

pub use analytic::BlackScholesEngine;
pub use pde::DividendFdEngine;
pub use tree::{BinomialTreeEngine, TreeParameterization};

/// Engine family chosen for one valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    AnalyticEuropean,
    Binomial,
    FiniteDifference,
}

impl EngineKind {
    /// Picks the engine for `exercise` under `dividends`.
    ///
    /// # Examples
    /// ```
    /// use equity_pricer::core::ExerciseStyle;
    /// use equity_pricer::engines::EngineKind;
    /// use equity_pricer::market::Dividends;
    ///
    /// assert_eq!(
    ///     EngineKind::select(ExerciseStyle::American, &Dividends::Yield(0.02)),
    ///     EngineKind::Binomial
    /// );
    /// ```
    pub fn select(exercise: ExerciseStyle, dividends: &Dividends) -> Self {
        Self::for_request(exercise, dividends.is_discrete())
    }

    /// Same decision before a market model exists, from whether the request
    /// carries cash dividends.
    pub fn for_request(exercise: ExerciseStyle, discrete_dividends: bool) -> Self {
        match (discrete_dividends, exercise) {
            (true, _) => Self::FiniteDifference,
            (false, ExerciseStyle::European) => Self::AnalyticEuropean,
            (false, ExerciseStyle::American) => Self::Binomial,
        }
    }

    /// Smallest step count the engine accepts; the analytic engine has none.
    pub fn min_steps(self) -> usize {
        match self {
            Self::AnalyticEuropean => 0,
            Self::Binomial => tree::MIN_TREE_STEPS,
            Self::FiniteDifference => pde::MIN_FD_STEPS,
        }
    }

    /// Instantiates the engine with the given resolution.
    pub fn build(
        self,
        steps: usize,
        parameterization: TreeParameterization,
    ) -> Box<dyn PricingEngine> {
        match self {
            Self::AnalyticEuropean => Box::new(BlackScholesEngine::new()),
            Self::Binomial => {
                Box::new(BinomialTreeEngine::new(steps).with_parameterization(parameterization))
            }
            Self::FiniteDifference => Box::new(DividendFdEngine::new(steps)),
        }
    }
}
