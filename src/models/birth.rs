//! Birth models for spontaneous target appearance
//!
//! Describes how new targets enter the PHD. Births are an input to each time
//! step, never part of the stored mixture.

use nalgebra::{DVector, RealField};
use num_traits::Float;

use super::observation::LinearObservation;
use crate::types::gaussian::{GaussianComponent, GaussianMixture};
use crate::{ensure_dim, PhdError, Result};

/// Default weight given to each measurement-driven birth hypothesis.
pub const DEFAULT_BIRTH_WEIGHT: f64 = 0.001;

/// Birth model combining a fixed birth mixture with measurement-driven births.
///
/// The fixed mixture covers known entry points. Measurement-driven births
/// place a component with weight `w_b` and covariance R at each measurement,
/// hypothesizing a target at the last sensor observation.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthModel<T: RealField> {
    birth_weight: T,
    components: GaussianMixture<T>,
}

impl<T: RealField + Float + Copy> BirthModel<T> {
    /// Creates a birth model with no fixed components and the default weight.
    pub fn new() -> Self {
        Self {
            birth_weight: nalgebra::convert(DEFAULT_BIRTH_WEIGHT),
            components: GaussianMixture::new(),
        }
    }

    /// Creates a birth model from a fixed birth mixture.
    pub fn from_mixture(components: GaussianMixture<T>) -> Self {
        Self {
            components,
            ..Self::new()
        }
    }

    /// Sets the weight of measurement-driven births.
    ///
    /// # Errors
    /// [`PhdError::InvalidParameter`] if the weight is negative or not finite.
    pub fn with_birth_weight(mut self, birth_weight: T) -> Result<Self> {
        if !Float::is_finite(birth_weight) || birth_weight < T::zero() {
            return Err(PhdError::InvalidParameter {
                name: "birth_weight",
                reason: "must be finite and non-negative",
            });
        }
        self.birth_weight = birth_weight;
        Ok(self)
    }

    /// Adds a fixed birth component.
    pub fn add_component(&mut self, component: GaussianComponent<T>) {
        self.components.push(component);
    }

    /// Weight `w_b` given to each measurement-driven birth.
    #[inline]
    pub fn birth_weight(&self) -> T {
        self.birth_weight
    }

    /// The fixed birth mixture.
    #[inline]
    pub fn components(&self) -> &GaussianMixture<T> {
        &self.components
    }

    /// Returns the total expected number of births per time step from the
    /// fixed mixture.
    pub fn total_birth_mass(&self) -> T {
        self.components.total_weight()
    }

    /// Creates one birth hypothesis per measurement.
    ///
    /// Each measurement `z` becomes a component `(w_b, z, R)`. The measurement
    /// is used directly as a state mean, so this requires the state and
    /// measurement dimensions to agree.
    ///
    /// # Errors
    /// [`PhdError::Dimension`] if `H` is not square or a measurement has the
    /// wrong length.
    pub fn birth_from_measurements(
        &self,
        measurements: &[DVector<T>],
        observation: &LinearObservation<T>,
    ) -> Result<Vec<GaussianComponent<T>>> {
        let m = observation.measurement_dim();
        ensure_dim("birth state dimension", observation.state_dim(), m)?;

        measurements
            .iter()
            .map(|z| {
                ensure_dim("measurement length", m, z.len())?;
                Ok(GaussianComponent::from_parts(
                    self.birth_weight,
                    z.clone(),
                    observation.measurement_noise().clone(),
                ))
            })
            .collect()
    }
}

impl<T: RealField + Float + Copy> Default for BirthModel<T> {
    fn default() -> Self {
        Self::new()
    }
}
