//! Closed-form analytic pricing engines.

pub mod black_scholes;

pub use black_scholes::{BlackScholesEngine, bs_delta, bs_gamma, bs_price};
