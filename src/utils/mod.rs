//! Utility functions for multi-target tracking
//!
//! Component pruning and merging.

mod pruning;

pub use pruning::*;
