//! Analysis modules.
//!
//! Pure aggregation over a thread's reflection history.

pub mod aggregator;

pub use aggregator::*;
