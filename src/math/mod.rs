//! Numerical building blocks shared by the engines and estimators.

use statrs::function::erf::erfc;

pub mod timeseries;

pub use timeseries::{
    log_returns_newest_first, population_std_dev, realized_vol_close_to_close, sample_mean,
};

pub fn normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF, `0.5 * erfc(-x / sqrt(2))`.
///
/// Absolute error is around `1e-12` in the body; the `erfc` form keeps small
/// tail probabilities relatively accurate.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * std::f64::consts::FRAC_1_SQRT_2)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn cdf_reference_points() {
        assert_eq!(normal_cdf(0.0), 0.5);
        assert_relative_eq!(normal_cdf(1.96), 0.975_002_104_851_779_5, epsilon = 1e-11);
        assert_relative_eq!(normal_cdf(-1.0), 0.158_655_253_931_457, epsilon = 1e-11);
        assert_relative_eq!(normal_cdf(-8.0), 6.220_960_574_271_785e-16, max_relative = 1e-8);
    }

    #[test]
    fn cdf_is_symmetric() {
        for x in [0.1, 0.7, 1.3, 2.9, 4.4] {
            assert_relative_eq!(normal_cdf(x) + normal_cdf(-x), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn pdf_peak() {
        assert_relative_eq!(normal_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-16);
        assert_relative_eq!(normal_pdf(1.5), normal_pdf(-1.5), epsilon = 1e-16);
    }
}
