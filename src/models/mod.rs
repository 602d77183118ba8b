//! Model parameters for the GM-PHD filter
//!
//! Target dynamics, sensor characteristics, clutter and target birth. All
//! models are immutable once built.

mod birth;
mod clutter;
mod observation;
mod transition;

pub use birth::*;
pub use clutter::*;
pub use observation::*;
pub use transition::*;

use nalgebra::RealField;

use crate::{PhdError, Result};

/// Rejects probabilities outside [0, 1], including NaN.
pub(crate) fn check_probability<T: RealField + Copy>(name: &'static str, p: T) -> Result<()> {
    if p >= T::zero() && p <= T::one() {
        Ok(())
    } else {
        Err(PhdError::InvalidParameter {
            name,
            reason: "probability must be in [0, 1]",
        })
    }
}
