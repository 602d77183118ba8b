//! GM-PHD: Gaussian Mixture Probability Hypothesis Density filtering for Rust
//!
//! Estimates the number and states of an unknown, time-varying set of targets
//! from cluttered measurements without explicit measurement-to-track
//! association.
//!
//! # Features
//!
//! - **Pure stages**: prediction, update and pruning each take a mixture and
//!   return a new one; only [`filters::phd::GmPhdFilter`] replaces its state
//! - **All-or-nothing steps**: a failed iteration leaves the mixture untouched
//! - **Runtime-checked shapes**: dimension mismatches surface as [`PhdError`]
//!
//! Reference: Vo, B.-N., & Ma, W.-K. (2006). "The Gaussian Mixture
//! Probability Hypothesis Density Filter"

pub mod filters;
pub mod models;
pub mod types;
pub mod utils;

pub mod prelude {
    pub use crate::filters::phd::*;
    pub use crate::models::*;
    pub use crate::types::gaussian::*;
    pub use crate::utils::*;
    pub use crate::{PhdError, Result};
}

/// Error types for the library
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhdError {
    /// Vector or matrix shape disagrees with the configured dimensions
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    Dimension {
        /// What was being checked (e.g. "measurement length")
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A matrix that must be inverted is singular or not positive definite
    #[error("singular matrix: {context}")]
    SingularMatrix {
        /// Which matrix failed
        context: &'static str,
    },

    /// Clutter is zero and every detection weight for a measurement is zero
    #[error("degenerate normalization for measurement {measurement}: zero clutter and zero detection weight")]
    DegenerateNormalization {
        /// Index of the offending measurement
        measurement: usize,
    },

    /// A model or configuration parameter is out of range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

pub type Result<T> = ::core::result::Result<T, PhdError>;

pub(crate) fn ensure_dim(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(PhdError::Dimension {
            context,
            expected,
            actual,
        })
    }
}
