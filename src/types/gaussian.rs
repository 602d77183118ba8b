//! Gaussian components and mixtures
//!
//! This module provides weighted Gaussian components for representing
//! the PHD intensity in multi-target tracking.

use ::core::f64::consts::PI;
use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector, Dyn, RealField};
use num_traits::Float;

use super::transforms::propagate_covariance;
use crate::{ensure_dim, PhdError, Result};

// ============================================================================
// Gaussian Component
// ============================================================================

/// A weighted Gaussian component of the PHD intensity.
///
/// The weight is the component's contribution to the expected number of
/// targets. Mean and covariance always share the same dimension; the fields
/// are private so a built component cannot be reshaped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianComponent<T: RealField> {
    weight: T,
    mean: DVector<T>,
    covariance: DMatrix<T>,
}

impl<T: RealField + Float + Copy> GaussianComponent<T> {
    /// Creates a new Gaussian component.
    ///
    /// # Errors
    /// - [`PhdError::Dimension`] if the covariance is not `n x n` for a mean of length `n`
    /// - [`PhdError::InvalidParameter`] if the weight is negative or not finite
    pub fn new(weight: T, mean: DVector<T>, covariance: DMatrix<T>) -> Result<Self> {
        let n = mean.len();
        ensure_dim("covariance rows", n, covariance.nrows())?;
        ensure_dim("covariance columns", n, covariance.ncols())?;
        if !Float::is_finite(weight) || weight < T::zero() {
            return Err(PhdError::InvalidParameter {
                name: "weight",
                reason: "must be finite and non-negative",
            });
        }
        Ok(Self::from_parts(weight, mean, covariance))
    }

    /// Builds a component whose shapes are already known to agree.
    #[inline]
    pub(crate) fn from_parts(weight: T, mean: DVector<T>, covariance: DMatrix<T>) -> Self {
        debug_assert_eq!(mean.len(), covariance.nrows());
        debug_assert_eq!(mean.len(), covariance.ncols());
        Self {
            weight,
            mean,
            covariance,
        }
    }

    #[inline]
    pub fn weight(&self) -> T {
        self.weight
    }

    #[inline]
    pub fn mean(&self) -> &DVector<T> {
        &self.mean
    }

    #[inline]
    pub fn covariance(&self) -> &DMatrix<T> {
        &self.covariance
    }

    /// State dimension `n`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Decomposes the component into `(weight, mean, covariance)`.
    pub fn into_parts(self) -> (T, DVector<T>, DMatrix<T>) {
        (self.weight, self.mean, self.covariance)
    }

    /// Returns a copy with the weight multiplied by `factor`.
    #[inline]
    pub fn scale_weight(&self, factor: T) -> Self {
        self.with_weight(self.weight * factor)
    }

    /// Returns a copy with the weight replaced.
    #[inline]
    pub fn with_weight(&self, weight: T) -> Self {
        Self {
            weight,
            mean: self.mean.clone(),
            covariance: self.covariance.clone(),
        }
    }

    /// Predicts this Gaussian through a linear transition model.
    ///
    /// The weight is carried over unchanged.
    pub fn predict(&self, transition: &DMatrix<T>, process_noise: &DMatrix<T>) -> Self {
        Self {
            weight: self.weight,
            mean: transition * &self.mean,
            covariance: propagate_covariance(transition, &self.covariance, process_noise),
        }
    }
}

// ============================================================================
// Gaussian Density
// ============================================================================

/// A covariance matrix with its Cholesky factor and normalizing constant.
///
/// Factor once, then evaluate densities and solve linear systems against the
/// same matrix as often as needed.
#[derive(Debug, Clone)]
pub struct FactoredCovariance<T: RealField> {
    cholesky: Cholesky<T, Dyn>,
    /// (2π)^(n/2) |Σ|^(1/2)
    normalizer: T,
}

impl<T: RealField + Float + Copy> FactoredCovariance<T> {
    /// Factors a symmetric positive definite covariance.
    ///
    /// `context` names the matrix in the error.
    ///
    /// # Errors
    /// - [`PhdError::Dimension`] if the matrix is not square
    /// - [`PhdError::SingularMatrix`] if it is not positive definite
    pub fn new(covariance: &DMatrix<T>, context: &'static str) -> Result<Self> {
        let n = covariance.nrows();
        ensure_dim("factored covariance columns", n, covariance.ncols())?;

        let cholesky = covariance
            .clone()
            .cholesky()
            .ok_or(PhdError::SingularMatrix { context })?;

        // sqrt(det(Σ)) = prod(diag(L))
        let l = cholesky.l_dirty();
        let mut sqrt_det = T::one();
        for i in 0..n {
            sqrt_det = sqrt_det * l[(i, i)];
        }
        if !(sqrt_det > T::zero()) {
            return Err(PhdError::SingularMatrix { context });
        }

        let half: T = nalgebra::convert(0.5);
        let two_pi: T = nalgebra::convert(2.0 * PI);
        let dim: T = nalgebra::convert(n as f64);
        let normalizer = Float::powf(two_pi, dim * half) * sqrt_det;

        Ok(Self {
            cholesky,
            normalizer,
        })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.cholesky.l_dirty().nrows()
    }

    /// Solves Σ X = B.
    pub fn solve(&self, rhs: &DMatrix<T>) -> DMatrix<T> {
        self.cholesky.solve(rhs)
    }

    /// Evaluates N(x; mean, Σ).
    ///
    /// # Errors
    /// [`PhdError::Dimension`] if `x` or `mean` do not match the factor.
    pub fn density(&self, x: &DVector<T>, mean: &DVector<T>) -> Result<T> {
        let n = self.dim();
        ensure_dim("density mean length", n, mean.len())?;
        ensure_dim("density point length", n, x.len())?;

        let diff = x - mean;
        let mahal_sq = diff.dot(&self.cholesky.solve(&diff));
        let half: T = nalgebra::convert(0.5);

        Ok(Float::exp(-half * mahal_sq) / self.normalizer)
    }
}

/// Evaluates the multivariate Gaussian density N(x; mean, covariance).
///
/// p(x) = (2π)^(-n/2) |Σ|^(-1/2) exp(-0.5 * (x-μ)^T Σ^{-1} (x-μ))
///
/// Factors the covariance on every call; use [`FactoredCovariance`] when the
/// same covariance is evaluated repeatedly.
///
/// # Errors
/// - [`PhdError::Dimension`] on shape mismatch
/// - [`PhdError::SingularMatrix`] if the covariance is not positive definite
pub fn gaussian_density<T: RealField + Float + Copy>(
    x: &DVector<T>,
    mean: &DVector<T>,
    covariance: &DMatrix<T>,
) -> Result<T> {
    ensure_dim("density covariance rows", mean.len(), covariance.nrows())?;
    FactoredCovariance::new(covariance, "density covariance")?.density(x, mean)
}

// ============================================================================
// Gaussian Mixture
// ============================================================================

/// A Gaussian mixture approximating the PHD.
///
/// Component order carries no meaning. The total weight approximates the
/// expected number of targets.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianMixture<T: RealField> {
    components: Vec<GaussianComponent<T>>,
}

impl<T: RealField + Float + Copy> GaussianMixture<T> {
    /// Creates an empty mixture.
    #[inline]
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Creates a mixture with the given capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            components: Vec::with_capacity(capacity),
        }
    }

    /// Creates a mixture from a vector of components.
    #[inline]
    pub fn from_components(components: Vec<GaussianComponent<T>>) -> Self {
        Self { components }
    }

    /// Returns the number of components.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the mixture is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Adds a component to the mixture.
    #[inline]
    pub fn push(&mut self, component: GaussianComponent<T>) {
        self.components.push(component);
    }

    /// Extends the mixture with components from an iterator.
    #[inline]
    pub fn extend<I: IntoIterator<Item = GaussianComponent<T>>>(&mut self, iter: I) {
        self.components.extend(iter);
    }

    /// Returns the total weight (expected number of targets).
    pub fn total_weight(&self) -> T {
        self.components
            .iter()
            .fold(T::zero(), |acc, c| acc + c.weight)
    }

    /// Iterates over the components.
    #[inline]
    pub fn iter(&self) -> ::core::slice::Iter<'_, GaussianComponent<T>> {
        self.components.iter()
    }

    #[inline]
    pub fn components(&self) -> &[GaussianComponent<T>] {
        &self.components
    }

    #[inline]
    pub fn into_components(self) -> Vec<GaussianComponent<T>> {
        self.components
    }

    /// Fails on the first component whose dimension differs from `dim`.
    pub(crate) fn check_dim(&self, context: &'static str, dim: usize) -> Result<()> {
        self.components
            .iter()
            .try_for_each(|c| ensure_dim(context, dim, c.dim()))
    }
}

impl<T: RealField + Float + Copy> Default for GaussianMixture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealField + Float + Copy> FromIterator<GaussianComponent<T>> for GaussianMixture<T> {
    fn from_iter<I: IntoIterator<Item = GaussianComponent<T>>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

impl<T: RealField> IntoIterator for GaussianMixture<T> {
    type Item = GaussianComponent<T>;
    type IntoIter = ::std::vec::IntoIter<GaussianComponent<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.into_iter()
    }
}

impl<'a, T: RealField> IntoIterator for &'a GaussianMixture<T> {
    type Item = &'a GaussianComponent<T>;
    type IntoIter = ::core::slice::Iter<'a, GaussianComponent<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}
