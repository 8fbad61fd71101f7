//! Day-count conventions used to turn calendar dates into model time.

pub mod day_count;

pub use day_count::{DAYS_PER_YEAR, checked_year_fraction, year_fraction};
