//! `equity_pricer` values single-name equity options under Black-Scholes-Merton
//! with European and American exercise, a continuous dividend yield or a dated
//! schedule of cash dividends, and historical volatility estimated from an
//! injected price source when no volatility is supplied.
//!
//! Engines:
//! - analytic BSM for European exercise without cash dividends,
//! - Cox-Ross-Rubinstein binomial lattice for American exercise without cash dividends,
//! - Crank-Nicolson finite differences with spot jumps on ex-dates otherwise.
//!
//! References:
//! - Hull, *Options, Futures, and Other Derivatives* (11th ed.), Ch. 13, 15, 21.
//! - Cox, Ross and Rubinstein (1979) for the binomial lattice.
//! - Wilmott, *Paul Wilmott on Quantitative Finance* (2006) for finite differences
//!   with discrete dividends.
//!
//! Numerical considerations:
//! - Lattice and grid resolution come from [`instruments::OptionSpec::steps`].
//! - Year fractions use Act/365F without holiday adjustment.
//! - Historical volatility sums returns in a fixed order, so a fixed series gives
//!   bit-identical estimates.
//!
//! # Feature Flags
//! - `parallel`: prices independent requests on Rayon in [`pricing::Pricer::calculate_many`].
//! - `http`: enables the Quandl datatables price source.
//!
//! # Quick Start
//! ```rust
//! use chrono::NaiveDate;
//! use equity_pricer::prelude::*;
//!
//! let spec = OptionSpec::builder("IBM", OptionType::Call)
//!     .strike(140.0)
//!     .maturity(NaiveDate::from_ymd_opt(2018, 7, 20).unwrap())
//!     .spot(145.2)
//!     .risk_free_rate(0.001)
//!     .volatility(0.25)
//!     .cash_dividend(NaiveDate::from_ymd_opt(2018, 6, 15).unwrap(), 0.12)
//!     .build()
//!     .unwrap();
//!
//! let valuation = Pricer::new()
//!     .calculate(&spec, NaiveDate::from_ymd_opt(2018, 6, 14).unwrap())
//!     .unwrap();
//! assert_eq!(valuation.european.method, PricingMethod::FiniteDifference);
//! assert!(valuation.american.npv >= valuation.european.npv - 1e-9);
//! ```
//!
//! Estimate volatility from a CSV history:
//! ```rust
//! use chrono::NaiveDate;
//! use equity_pricer::data::CsvPriceSource;
//! use equity_pricer::vol::HistoricalVolatility;
//!
//! let csv = "ticker,date,adj_close\nIBM,2015-05-06,170.0\nIBM,2015-05-07,171.5\nIBM,2015-05-08,170.9\n";
//! let source = CsvPriceSource::from_reader(csv.as_bytes()).unwrap();
//! let vol = HistoricalVolatility::default()
//!     .estimate_from_source(&source, "IBM", NaiveDate::from_ymd_opt(2015, 5, 8).unwrap())
//!     .unwrap();
//! assert!(vol > 0.0);
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod engines;
pub mod instruments;
pub mod market;
pub mod math;
pub mod pricing;
pub mod rates;
pub mod vol;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::config::PricerConfig;
    pub use crate::core::*;
    pub use crate::data::{
        CsvPriceSource, DataError, HistoricalPriceSeries, HistoricalPriceSource,
        InMemoryPriceSource, PriceObservation,
    };
    pub use crate::engines::{
        BinomialTreeEngine, BlackScholesEngine, DividendFdEngine, EngineKind, TreeParameterization,
    };
    pub use crate::instruments::*;
    pub use crate::market::*;
    pub use crate::pricing::*;
    pub use crate::rates::*;
    pub use crate::vol::HistoricalVolatility;
}
