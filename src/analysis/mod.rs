//! Analysis modules.
//!
//! Reduction of per-combination result files into summary rows.

pub mod aggregator;

pub use aggregator::*;
