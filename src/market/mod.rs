//! Market state and dividend specifications.

pub mod dividends;
pub mod model;

pub use dividends::{CashDividend, CashDividendSchedule, DividendEvent, DividendSpec, Dividends};
pub use model::MarketModel;
