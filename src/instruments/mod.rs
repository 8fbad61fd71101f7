//! Instrument definitions priced by the engines.

pub mod vanilla;

pub use vanilla::{DEFAULT_STEPS, OptionSpec, OptionSpecBuilder};
