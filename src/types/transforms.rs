//! Linear-Gaussian transformation kernels
//!
//! Matrix products shared by the predictor and the updater. Shapes are
//! validated once when the models are built, so these functions assume
//! conforming operands.

use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

use super::gaussian::FactoredCovariance;

/// Propagates a covariance through a linear transition.
///
/// P' = F * P * F^T + Q
pub fn propagate_covariance<T: RealField + Copy>(
    transition: &DMatrix<T>,
    covariance: &DMatrix<T>,
    process_noise: &DMatrix<T>,
) -> DMatrix<T> {
    transition * covariance * transition.transpose() + process_noise
}

/// Projects a state into measurement space.
///
/// eta = H * x
#[inline]
pub fn observe<T: RealField + Copy>(obs_matrix: &DMatrix<T>, state: &DVector<T>) -> DVector<T> {
    obs_matrix * state
}

/// Computes the innovation covariance.
///
/// S = R + H * P * H^T
pub fn compute_innovation_covariance<T: RealField + Copy>(
    state_cov: &DMatrix<T>,
    obs_matrix: &DMatrix<T>,
    meas_noise: &DMatrix<T>,
) -> DMatrix<T> {
    obs_matrix * state_cov * obs_matrix.transpose() + meas_noise
}

/// Computes the Kalman gain matrix.
///
/// K = P * H^T * S^{-1}
///
/// where:
/// - P is the predicted state covariance
/// - H is the observation matrix
/// - S is the innovation covariance (R + H * P * H^T), already factored
///
/// S is symmetric, so K^T = S^{-1} * (P * H^T)^T.
pub fn compute_kalman_gain<T: RealField + Float + Copy>(
    state_cov: &DMatrix<T>,
    obs_matrix: &DMatrix<T>,
    innovation: &FactoredCovariance<T>,
) -> DMatrix<T> {
    let cross_cov = state_cov * obs_matrix.transpose();
    innovation.solve(&cross_cov.transpose()).transpose()
}

/// Posterior covariance after a Kalman correction.
///
/// P_updated = (I - K*H) * P
pub fn simple_covariance_update<T: RealField + Copy>(
    state_cov: &DMatrix<T>,
    kalman_gain: &DMatrix<T>,
    obs_matrix: &DMatrix<T>,
) -> DMatrix<T> {
    let n = state_cov.nrows();
    let i_kh = DMatrix::<T>::identity(n, n) - kalman_gain * obs_matrix;
    i_kh * state_cov
}
