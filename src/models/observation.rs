//! Observation (sensor) models
//!
//! Describes how sensor measurements relate to target states.

use nalgebra::{DMatrix, RealField};
use num_traits::Float;

use super::check_probability;
use crate::{ensure_dim, PhdError, Result};

/// Linear-Gaussian observation model.
///
/// Describes the measurement process:
/// z = H * x + v
///
/// where:
/// - H is the observation matrix (m x n)
/// - v is zero-mean Gaussian measurement noise with covariance R (m x m)
///
/// A target is detected with constant probability p_d.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearObservation<T: RealField> {
    observation_matrix: DMatrix<T>,
    measurement_noise: DMatrix<T>,
    detection_probability: T,
}

impl<T: RealField + Float + Copy> LinearObservation<T> {
    /// Creates an observation model.
    ///
    /// The state dimension `n` is checked against the transition model when
    /// the filter is assembled.
    ///
    /// # Errors
    /// - [`PhdError::Dimension`] unless `R` is `m x m` for an `m x n` `H` with `m >= 1`
    /// - [`PhdError::InvalidParameter`] if `p_detection` is not in [0, 1]
    pub fn new(
        observation_matrix: DMatrix<T>,
        measurement_noise: DMatrix<T>,
        p_detection: T,
    ) -> Result<Self> {
        let m = observation_matrix.nrows();
        if m == 0 {
            return Err(PhdError::InvalidParameter {
                name: "observation_matrix",
                reason: "measurement dimension must be at least 1",
            });
        }
        ensure_dim("measurement noise rows", m, measurement_noise.nrows())?;
        ensure_dim("measurement noise columns", m, measurement_noise.ncols())?;
        check_probability("p_detection", p_detection)?;

        Ok(Self {
            observation_matrix,
            measurement_noise,
            detection_probability: p_detection,
        })
    }

    /// Position-only sensor in 2D.
    ///
    /// Observes [x, y] from state [x, y, vx, vy].
    pub fn position_sensor_2d(sigma_pos: T, p_detection: T) -> Result<Self> {
        if !(sigma_pos > T::zero()) {
            return Err(PhdError::InvalidParameter {
                name: "sigma_pos",
                reason: "must be positive",
            });
        }
        let one = T::one();
        let zero = T::zero();
        #[rustfmt::skip]
        let h = DMatrix::from_row_slice(2, 4, &[
            one, zero, zero, zero,
            zero, one, zero, zero,
        ]);
        let r = DMatrix::from_diagonal_element(2, 2, sigma_pos * sigma_pos);

        Self::new(h, r, p_detection)
    }

    /// Measurement dimension `m`.
    #[inline]
    pub fn measurement_dim(&self) -> usize {
        self.observation_matrix.nrows()
    }

    /// State dimension `n` implied by H.
    #[inline]
    pub fn state_dim(&self) -> usize {
        self.observation_matrix.ncols()
    }

    /// The observation matrix H.
    #[inline]
    pub fn observation_matrix(&self) -> &DMatrix<T> {
        &self.observation_matrix
    }

    /// The measurement noise covariance R.
    #[inline]
    pub fn measurement_noise(&self) -> &DMatrix<T> {
        &self.measurement_noise
    }

    #[inline]
    pub fn detection_probability(&self) -> T {
        self.detection_probability
    }
}
