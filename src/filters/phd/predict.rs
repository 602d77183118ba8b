//! GM-PHD prediction
//!
//! Discrete-time linear-Gaussian prediction with no control input:
//! w' = p_s * w, m' = F * m, P' = Q + F * P * F^T.

use nalgebra::RealField;
use num_traits::Float;

use crate::models::LinearTransition;
use crate::types::gaussian::{GaussianComponent, GaussianMixture};
use crate::{ensure_dim, Result};

/// Predicts surviving components one step ahead, scaling weights by p_s.
///
/// # Errors
/// [`crate::PhdError::Dimension`] if a component's dimension differs from
/// the transition model's.
pub fn predict_existing<T: RealField + Float + Copy>(
    mixture: &GaussianMixture<T>,
    transition: &LinearTransition<T>,
) -> Result<GaussianMixture<T>> {
    mixture.check_dim("existing component dimension", transition.state_dim())?;

    let p_s = transition.survival_probability();
    Ok(mixture
        .iter()
        .map(|c| propagate(c, transition, p_s))
        .collect())
}

/// Predicts birth components one step ahead.
///
/// Births keep their weight; only mean and covariance are propagated.
///
/// # Errors
/// [`crate::PhdError::Dimension`] if a component's dimension differs from
/// the transition model's.
pub fn predict_birth<T: RealField + Float + Copy>(
    born: &[GaussianComponent<T>],
    transition: &LinearTransition<T>,
) -> Result<GaussianMixture<T>> {
    let mut predicted = GaussianMixture::with_capacity(born.len());
    for c in born {
        ensure_dim("birth component dimension", transition.state_dim(), c.dim())?;
        predicted.push(propagate(c, transition, T::one()));
    }
    Ok(predicted)
}

fn propagate<T: RealField + Float + Copy>(
    component: &GaussianComponent<T>,
    transition: &LinearTransition<T>,
    weight_factor: T,
) -> GaussianComponent<T> {
    let (weight, mean, covariance) = component
        .predict(transition.transition_matrix(), transition.process_noise())
        .into_parts();
    GaussianComponent::from_parts(weight * weight_factor, mean, covariance)
}
