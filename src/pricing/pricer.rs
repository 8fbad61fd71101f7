//! Module `pricing::pricer`.
//!
//! Orchestrates one valuation request:
//!
//! 1. `configured`: request and calculation date validated,
//! 2. `volatility_resolved`: supplied volatility taken or historical estimate fetched,
//! 3. `calibrated`: [`MarketModel`] built,
//! 4. `priced`: European and American engines run.
//!
//! Any error is terminal for the call. Nothing is shared between calls.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PricerConfig;
use crate::core::{ExerciseStyle, PriceResult, PricingError};
use crate::data::HistoricalPriceSource;
use crate::engines::EngineKind;
use crate::instruments::OptionSpec;
use crate::market::{DividendSpec, MarketModel};
use crate::rates::checked_year_fraction;

/// Where the volatility of a valuation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilitySource {
    Supplied,
    Historical,
}

/// European and American results of one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub european: PriceResult,
    pub american: PriceResult,
    /// Volatility used by both engines.
    pub volatility: f64,
    pub volatility_source: VolatilitySource,
}

impl Valuation {
    /// American minus European value.
    #[inline]
    pub fn early_exercise_premium(&self) -> f64 {
        self.american.npv - self.european.npv
    }
}

/// Equity option pricer.
///
/// Holds an optional historical price source used when a request carries no
/// volatility.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use equity_pricer::core::OptionType;
/// use equity_pricer::instruments::OptionSpec;
/// use equity_pricer::pricing::Pricer;
///
/// let spec = OptionSpec::builder("DUMMY", OptionType::Call)
///     .strike(130.0)
///     .maturity(NaiveDate::from_ymd_opt(2016, 1, 15).unwrap())
///     .spot(127.62)
///     .risk_free_rate(0.001)
///     .volatility(0.20)
///     .dividend_yield(0.0163)
///     .build()
///     .unwrap();
/// let valuation = Pricer::new()
///     .calculate(&spec, NaiveDate::from_ymd_opt(2015, 5, 8).unwrap())
///     .unwrap();
/// assert!((valuation.european.npv - 6.749_271_812_460_607).abs() < 1e-10);
/// assert!(valuation.early_exercise_premium() > 0.0);
/// ```
#[derive(Clone, Default)]
pub struct Pricer {
    config: PricerConfig,
    source: Option<Arc<dyn HistoricalPriceSource>>,
}

impl fmt::Debug for Pricer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pricer")
            .field("config", &self.config)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl Pricer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PricerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_source(mut self, source: Arc<dyn HistoricalPriceSource>) -> Self {
        self.source = Some(source);
        self
    }

    #[inline]
    pub fn config(&self) -> &PricerConfig {
        &self.config
    }

    /// Values `spec` as of `calc_date` with both exercise styles.
    ///
    /// # Errors
    /// Every [`PricingError`] of validation, volatility resolution, calibration
    /// and the engines. Input problems are reported before any data is fetched.
    pub fn calculate(
        &self,
        spec: &OptionSpec,
        calc_date: NaiveDate,
    ) -> Result<Valuation, PricingError> {
        let plan = self.configure(spec, calc_date)?;
        debug!(
            underlying = %spec.underlying,
            %calc_date,
            european = ?plan[0],
            american = ?plan[1],
            "stage: configured"
        );

        let (volatility, volatility_source) = self.resolve_volatility(spec, calc_date)?;
        debug!(volatility, source = ?volatility_source, "stage: volatility_resolved");

        let market = MarketModel::new(spec, calc_date, volatility)?;
        debug!(expiry = market.expiry(), "stage: calibrated");

        let european = self.run(plan[0], &market, spec, ExerciseStyle::European)?;
        let american = self.run(plan[1], &market, spec, ExerciseStyle::American)?;
        debug!(
            european_npv = european.npv,
            american_npv = american.npv,
            "stage: priced"
        );

        Ok(Valuation {
            european,
            american,
            volatility,
            volatility_source,
        })
    }

    /// Values independent requests, in parallel with the `parallel` feature.
    /// Results keep the order of `requests`.
    pub fn calculate_many(
        &self,
        requests: &[(OptionSpec, NaiveDate)],
    ) -> Vec<Result<Valuation, PricingError>> {
        let price_one = |(spec, calc_date): &(OptionSpec, NaiveDate)| self.calculate(spec, *calc_date);

        #[cfg(feature = "parallel")]
        let results = requests.par_iter().map(price_one).collect();
        #[cfg(not(feature = "parallel"))]
        let results = requests.iter().map(price_one).collect();
        results
    }

    /// Validates everything that does not need a volatility and returns the
    /// European and American engine choices.
    fn configure(
        &self,
        spec: &OptionSpec,
        calc_date: NaiveDate,
    ) -> Result<[EngineKind; 2], PricingError> {
        self.config.validate()?;
        spec.validate()?;
        let expiry = checked_year_fraction(calc_date, spec.maturity)?;
        PricingError::require_positive("time_to_maturity", expiry)?;
        if let DividendSpec::Discrete(schedule) = &spec.dividends {
            schedule.validate_window(calc_date, spec.maturity)?;
        }

        let discrete = spec.dividends.has_discrete_dividends();
        let plan = [
            EngineKind::for_request(ExerciseStyle::European, discrete),
            EngineKind::for_request(ExerciseStyle::American, discrete),
        ];
        for kind in plan {
            let minimum = kind.min_steps();
            if spec.steps < minimum {
                return Err(PricingError::InvalidResolution {
                    steps: spec.steps,
                    minimum,
                });
            }
        }
        Ok(plan)
    }

    fn resolve_volatility(
        &self,
        spec: &OptionSpec,
        calc_date: NaiveDate,
    ) -> Result<(f64, VolatilitySource), PricingError> {
        if let Some(vol) = spec.volatility {
            return Ok((vol, VolatilitySource::Supplied));
        }
        let source = self.source.as_deref().ok_or_else(|| {
            PricingError::DataUnavailable(format!(
                "no volatility supplied for `{}` and no historical price source configured",
                spec.underlying
            ))
        })?;
        let vol = self
            .config
            .estimator()
            .estimate_from_source(source, &spec.underlying, calc_date)?;
        let vol = PricingError::require_positive("volatility", vol)?;
        Ok((vol, VolatilitySource::Historical))
    }

    fn run(
        &self,
        kind: EngineKind,
        market: &MarketModel,
        spec: &OptionSpec,
        exercise: ExerciseStyle,
    ) -> Result<PriceResult, PricingError> {
        let engine = kind.build(spec.steps, self.config.tree);
        let result = engine.price(market, spec, exercise)?;
        debug!(
            engine = ?kind,
            ?exercise,
            npv = result.npv,
            delta = result.delta,
            gamma = result.gamma,
            "engine result"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::core::{OptionType, PricingMethod};
    use crate::data::{HistoricalPriceSeries, InMemoryPriceSource};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario_a() -> OptionSpec {
        OptionSpec::builder("DUMMY", OptionType::Call)
            .strike(130.0)
            .maturity(date(2016, 1, 15))
            .spot(127.62)
            .risk_free_rate(0.001)
            .volatility(0.20)
            .dividend_yield(0.0163)
            .build()
            .unwrap()
    }

    fn synthetic_history(ticker: &str, end: NaiveDate) -> HistoricalPriceSeries {
        let mut price = 160.0;
        let pairs: Vec<(NaiveDate, f64)> = (0..120)
            .rev()
            .map(|back| {
                price *= if back % 3 == 0 { 1.012 } else { 0.995 };
                (end - chrono::Duration::days(back), price)
            })
            .collect();
        HistoricalPriceSeries::from_pairs(ticker, pairs)
    }

    #[test]
    fn yield_request_uses_analytic_and_binomial() {
        let valuation = Pricer::new().calculate(&scenario_a(), date(2015, 5, 8)).unwrap();
        assert_eq!(valuation.european.method, PricingMethod::Analytic);
        assert_eq!(valuation.american.method, PricingMethod::Binomial);
        assert_eq!(valuation.volatility_source, VolatilitySource::Supplied);
        assert_relative_eq!(valuation.european.npv, 6.749_271_812_460_607, epsilon = 1e-10);
        assert_relative_eq!(valuation.american.npv, 6.842_103_287_285_56, epsilon = 1e-8);
    }

    #[test]
    fn missing_volatility_uses_source() {
        let calc = date(2015, 5, 8);
        let spec = OptionSpec {
            underlying: "IBM".to_string(),
            volatility: None,
            ..scenario_a()
        };
        let source = Arc::new(InMemoryPriceSource::new().with_series(synthetic_history("IBM", calc)));
        let pricer = Pricer::new().with_source(source.clone());
        let valuation = pricer.calculate(&spec, calc).unwrap();
        assert_eq!(valuation.volatility_source, VolatilitySource::Historical);
        let expected = pricer
            .config()
            .estimator()
            .estimate_from_source(source.as_ref(), "IBM", calc)
            .unwrap();
        assert_eq!(valuation.volatility, expected);
    }

    #[test]
    fn missing_volatility_without_source_is_data_unavailable() {
        let spec = OptionSpec {
            volatility: None,
            ..scenario_a()
        };
        assert!(matches!(
            Pricer::new().calculate(&spec, date(2015, 5, 8)),
            Err(PricingError::DataUnavailable(_))
        ));
    }

    #[test]
    fn input_errors_surface_before_data_access() {
        // the empty source would fail with DataUnavailable if it were consulted
        let pricer = Pricer::new().with_source(Arc::new(InMemoryPriceSource::new()));
        let spec = OptionSpec {
            volatility: None,
            ..scenario_a()
        };
        assert!(matches!(
            pricer.calculate(&spec, date(2016, 2, 1)),
            Err(PricingError::InvalidDateRange { .. })
        ));
        let coarse = OptionSpec { steps: 1, ..spec };
        assert_eq!(
            pricer.calculate(&coarse, date(2015, 5, 8)).unwrap_err(),
            PricingError::InvalidResolution { steps: 1, minimum: 2 }
        );
    }

    #[test]
    fn discrete_dividends_use_finite_difference_for_both_styles() {
        let spec = OptionSpec::builder("IBM", OptionType::Call)
            .strike(140.0)
            .maturity(date(2018, 7, 20))
            .spot(145.2)
            .risk_free_rate(0.001)
            .volatility(0.25)
            .cash_dividend(date(2018, 6, 15), 0.12)
            .build()
            .unwrap();
        let valuation = Pricer::new().calculate(&spec, date(2018, 6, 14)).unwrap();
        assert_eq!(valuation.european.method, PricingMethod::FiniteDifference);
        assert_eq!(valuation.american.method, PricingMethod::FiniteDifference);
        assert!(valuation.early_exercise_premium().abs() < 1e-6);

        let coarse = OptionSpec { steps: 3, ..spec };
        assert_eq!(
            Pricer::new().calculate(&coarse, date(2018, 6, 14)).unwrap_err(),
            PricingError::InvalidResolution { steps: 3, minimum: 4 }
        );
    }

    #[test]
    fn dividend_outside_window_is_rejected() {
        let spec = OptionSpec::builder("IBM", OptionType::Put)
            .strike(140.0)
            .maturity(date(2018, 7, 20))
            .spot(145.2)
            .volatility(0.25)
            .cash_dividend(date(2018, 6, 1), 0.12)
            .build()
            .unwrap();
        assert!(matches!(
            Pricer::new().calculate(&spec, date(2018, 6, 14)),
            Err(PricingError::InvalidDividendSchedule(_))
        ));
    }

    #[test]
    fn calculate_many_preserves_order() {
        let calc = date(2015, 5, 8);
        let put = OptionSpec {
            option_type: OptionType::Put,
            ..scenario_a()
        };
        let bad = OptionSpec {
            strike: 0.0,
            ..scenario_a()
        };
        let results = Pricer::new().calculate_many(&[
            (scenario_a(), calc),
            (put.clone(), calc),
            (bad, calc),
        ]);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Pricer::new().calculate(&scenario_a(), calc).unwrap()
        );
        assert_eq!(
            results[1].as_ref().unwrap(),
            &Pricer::new().calculate(&put, calc).unwrap()
        );
        assert!(results[2].is_err());
    }
}
