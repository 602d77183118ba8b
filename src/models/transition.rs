//! Transition (motion) models for target dynamics
//!
//! Describes how targets evolve over time.

use nalgebra::{DMatrix, RealField};
use num_traits::Float;

use super::check_probability;
use crate::{ensure_dim, PhdError, Result};

/// Linear-Gaussian transition model.
///
/// Describes target dynamics in the form:
/// x_{k+1} = F * x_k + w
///
/// where:
/// - F is the state transition matrix
/// - w is zero-mean Gaussian process noise with covariance Q
///
/// Targets survive from one step to the next with a constant probability p_s.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTransition<T: RealField> {
    transition_matrix: DMatrix<T>,
    process_noise: DMatrix<T>,
    survival_probability: T,
}

impl<T: RealField + Float + Copy> LinearTransition<T> {
    /// Creates a transition model.
    ///
    /// # Errors
    /// - [`PhdError::Dimension`] unless `F` and `Q` are both `n x n` with `n >= 1`
    /// - [`PhdError::InvalidParameter`] if `p_survival` is not in [0, 1]
    pub fn new(
        transition_matrix: DMatrix<T>,
        process_noise: DMatrix<T>,
        p_survival: T,
    ) -> Result<Self> {
        let n = transition_matrix.nrows();
        if n == 0 {
            return Err(PhdError::InvalidParameter {
                name: "transition_matrix",
                reason: "state dimension must be at least 1",
            });
        }
        ensure_dim("transition matrix columns", n, transition_matrix.ncols())?;
        ensure_dim("process noise rows", n, process_noise.nrows())?;
        ensure_dim("process noise columns", n, process_noise.ncols())?;
        check_probability("p_survival", p_survival)?;

        Ok(Self {
            transition_matrix,
            process_noise,
            survival_probability: p_survival,
        })
    }

    /// Constant velocity model in 2D.
    ///
    /// State: [x, y, vx, vy], discrete white noise acceleration with standard
    /// deviation `sigma_a`.
    pub fn constant_velocity_2d(dt: T, sigma_a: T, p_survival: T) -> Result<Self> {
        if !(dt >= T::zero()) {
            return Err(PhdError::InvalidParameter {
                name: "dt",
                reason: "must be non-negative",
            });
        }
        if !(sigma_a >= T::zero()) {
            return Err(PhdError::InvalidParameter {
                name: "sigma_a",
                reason: "must be non-negative",
            });
        }

        let one = T::one();
        let zero = T::zero();
        #[rustfmt::skip]
        let f = DMatrix::from_row_slice(4, 4, &[
            one, zero, dt, zero,
            zero, one, zero, dt,
            zero, zero, one, zero,
            zero, zero, zero, one,
        ]);

        let two: T = nalgebra::convert(2.0);
        let four: T = nalgebra::convert(4.0);
        let dt2 = dt * dt;
        let dt3 = dt2 * dt;
        let dt4 = dt3 * dt;
        let sigma_sq = sigma_a * sigma_a;

        let q11 = dt4 / four * sigma_sq;
        let q13 = dt3 / two * sigma_sq;
        let q33 = dt2 * sigma_sq;

        #[rustfmt::skip]
        let q = DMatrix::from_row_slice(4, 4, &[
            q11, zero, q13, zero,
            zero, q11, zero, q13,
            q13, zero, q33, zero,
            zero, q13, zero, q33,
        ]);

        Self::new(f, q, p_survival)
    }

    /// State dimension `n`.
    #[inline]
    pub fn state_dim(&self) -> usize {
        self.transition_matrix.nrows()
    }

    /// The state transition matrix F.
    #[inline]
    pub fn transition_matrix(&self) -> &DMatrix<T> {
        &self.transition_matrix
    }

    /// The process noise covariance Q.
    #[inline]
    pub fn process_noise(&self) -> &DMatrix<T> {
        &self.process_noise
    }

    #[inline]
    pub fn survival_probability(&self) -> T {
        self.survival_probability
    }
}
