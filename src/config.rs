//! Pricer configuration.
//!
//! Loaded programmatically or from TOML:
//!
//! ```toml
//! lookback_days = 92
//! periods_per_year = 252.0
//! tree = "log_drift"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::PricingError;
use crate::engines::TreeParameterization;
use crate::vol::{DEFAULT_LOOKBACK_DAYS, DEFAULT_PERIODS_PER_YEAR, HistoricalVolatility};

/// Settings shared by every pricing call of a [`crate::pricing::Pricer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricerConfig {
    /// Trailing calendar days used by the historical volatility estimator.
    pub lookback_days: i64,
    /// Annualization factor applied to daily return dispersion.
    pub periods_per_year: f64,
    /// Up-move probability used by the binomial engine.
    pub tree: TreeParameterization,
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            tree: TreeParameterization::default(),
        }
    }
}

impl PricerConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    ///
    /// # Examples
    /// ```
    /// use equity_pricer::config::PricerConfig;
    /// use equity_pricer::engines::TreeParameterization;
    ///
    /// let cfg = PricerConfig::from_toml_str("tree = \"textbook\"").unwrap();
    /// assert_eq!(cfg.tree, TreeParameterization::Textbook);
    /// assert_eq!(cfg.lookback_days, 92);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, PricingError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| PricingError::configuration(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading pricer configuration");
        let content = fs::read_to_string(path).map_err(|e| {
            PricingError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, PricingError> {
        toml::to_string_pretty(self).map_err(|e| PricingError::configuration(e.to_string()))
    }

    pub fn with_lookback_days(mut self, lookback_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    pub fn with_periods_per_year(mut self, periods_per_year: f64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }

    pub fn with_tree(mut self, tree: TreeParameterization) -> Self {
        self.tree = tree;
        self
    }

    /// # Errors
    /// [`PricingError::Configuration`] for a negative lookback or a non-positive
    /// annualization factor.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.estimator().validate()
    }

    /// Estimator configured from these settings.
    pub fn estimator(&self) -> HistoricalVolatility {
        HistoricalVolatility::new(self.lookback_days, self.periods_per_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(PricerConfig::from_toml_str("").unwrap(), PricerConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let cfg = PricerConfig::default()
            .with_lookback_days(30)
            .with_tree(TreeParameterization::Textbook);
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(PricerConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        assert!(matches!(
            PricerConfig::from_toml_str("periods_per_year = 0.0"),
            Err(PricingError::Configuration(_))
        ));
        assert!(matches!(
            PricerConfig::from_toml_str("lookback_days = -1"),
            Err(PricingError::Configuration(_))
        ));
        assert!(matches!(
            PricerConfig::from_toml_str("tree = \"trinomial\""),
            Err(PricingError::Configuration(_))
        ));
    }

    #[test]
    fn validation_matches_the_estimator() {
        for cfg in [
            PricerConfig::default(),
            PricerConfig::default().with_lookback_days(-5),
            PricerConfig::default().with_periods_per_year(f64::NAN),
        ] {
            assert_eq!(cfg.validate(), cfg.estimator().validate());
        }
    }

    #[test]
    fn missing_file_is_configuration_error() {
        assert!(matches!(
            PricerConfig::from_file("/nonexistent/pricer.toml"),
            Err(PricingError::Configuration(_))
        ));
    }
}
