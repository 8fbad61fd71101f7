//! Request-level pricing API.

pub mod pricer;

pub use pricer::{Pricer, Valuation, VolatilitySource};
