//! Clutter models for false alarm generation
//!
//! Describes the statistical properties of clutter (false alarms)
//! in the surveillance region.

use nalgebra::RealField;
use num_traits::Float;

use crate::{PhdError, Result};

/// Constant clutter intensity κ.
///
/// κ is the expected number of false alarms per unit measurement volume. It
/// enters the update as the additive term in each measurement's
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantClutter<T: RealField> {
    intensity: T,
}

impl<T: RealField + Float + Copy> ConstantClutter<T> {
    /// Creates a clutter model with intensity `kappa`.
    ///
    /// # Errors
    /// [`PhdError::InvalidParameter`] if `kappa` is negative or not finite.
    pub fn new(kappa: T) -> Result<Self> {
        if !Float::is_finite(kappa) || kappa < T::zero() {
            return Err(PhdError::InvalidParameter {
                name: "clutter",
                reason: "must be finite and non-negative",
            });
        }
        Ok(Self { intensity: kappa })
    }

    /// Uniform clutter: `clutter_rate` false alarms per scan spread over `volume`.
    pub fn uniform(clutter_rate: T, volume: T) -> Result<Self> {
        if !(volume > T::zero()) {
            return Err(PhdError::InvalidParameter {
                name: "volume",
                reason: "must be positive",
            });
        }
        Self::new(clutter_rate / volume)
    }

    /// Returns the clutter intensity κ.
    #[inline]
    pub fn intensity(&self) -> T {
        self.intensity
    }
}
