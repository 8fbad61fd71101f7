//! Finite-difference PDE pricing engines.

pub mod dividend_fd;
mod fd_common;

pub use dividend_fd::{DividendFdEngine, MIN_FD_STEPS};
