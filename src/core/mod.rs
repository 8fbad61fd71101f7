//! Core traits, common domain types, and library-wide result/error structures.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{PriceResult, PricingEngine};
pub use error::PricingError;
pub use types::{ExerciseStyle, OptionType, PricingMethod};
