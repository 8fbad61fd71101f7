//! Tree-based pricing engines.

pub mod binomial;

pub use binomial::{BinomialTreeEngine, MIN_TREE_STEPS, TreeParameterization};
