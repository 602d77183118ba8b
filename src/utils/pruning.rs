//! Component pruning and merging for Gaussian mixtures
//!
//! Bounds the growth of the mixture after each update while preserving the
//! expected target count.

use ::core::cmp::Ordering;
use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

use crate::types::gaussian::{GaussianComponent, GaussianMixture};
use crate::{PhdError, Result};

/// Configuration for pruning and merging operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PruningConfig<T: RealField> {
    /// Components with weight at or below this value are discarded
    pub truncation_threshold: T,
    /// Squared Mahalanobis distance to the pivot under which components merge
    pub merge_threshold: T,
    /// Maximum number of components after pruning
    pub max_components: usize,
}

impl<T: RealField + Float + Copy> PruningConfig<T> {
    /// Creates a pruning configuration with custom values.
    ///
    /// # Errors
    /// [`PhdError::InvalidParameter`] if a threshold is negative or NaN, or
    /// `max_components` is zero.
    pub fn new(truncation_threshold: T, merge_threshold: T, max_components: usize) -> Result<Self> {
        let config = Self {
            truncation_threshold,
            merge_threshold,
            max_components,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the thresholds and component cap.
    pub fn validate(&self) -> Result<()> {
        if !(self.truncation_threshold >= T::zero()) {
            return Err(PhdError::InvalidParameter {
                name: "truncation_threshold",
                reason: "must be non-negative",
            });
        }
        if !(self.merge_threshold >= T::zero()) {
            return Err(PhdError::InvalidParameter {
                name: "merge_threshold",
                reason: "must be non-negative",
            });
        }
        if self.max_components == 0 {
            return Err(PhdError::InvalidParameter {
                name: "max_components",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

impl<T: RealField + Float + Copy> Default for PruningConfig<T> {
    fn default() -> Self {
        Self {
            truncation_threshold: nalgebra::convert(1e-6),
            merge_threshold: nalgebra::convert(0.01),
            max_components: 100,
        }
    }
}

/// Discards components with weight at or below `threshold`.
pub fn truncate<T: RealField + Float + Copy>(
    mixture: &GaussianMixture<T>,
    threshold: T,
) -> GaussianMixture<T> {
    mixture
        .iter()
        .filter(|c| c.weight() > threshold)
        .cloned()
        .collect()
}

/// Keeps the `max_components` highest-weighted components.
pub fn cap_components<T: RealField + Float + Copy>(
    mixture: GaussianMixture<T>,
    max_components: usize,
) -> GaussianMixture<T> {
    let mut components = mixture.into_components();
    components.sort_by(|a, b| {
        b.weight()
            .partial_cmp(&a.weight())
            .unwrap_or(Ordering::Equal)
    });
    components.truncate(max_components);
    GaussianMixture::from_components(components)
}

/// Computes the squared Mahalanobis distance `(x - mu)^T P^{-1} (x - mu)`
/// given the precomputed inverse covariance.
pub fn mahalanobis_distance_squared<T: RealField + Copy>(
    x: &DVector<T>,
    mu: &DVector<T>,
    covariance_inv: &DMatrix<T>,
) -> T {
    let diff = x - mu;
    diff.dot(&(covariance_inv * &diff))
}

/// A group of components gathered around a pivot, by index into the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Index of the highest-weighted component of the cluster
    pub pivot: usize,
    /// Indices of all members, pivot included
    pub members: Vec<usize>,
}

/// Greedily partitions the mixture into merge clusters.
///
/// Repeatedly takes the heaviest remaining component as pivot and gathers
/// every remaining component within `threshold` squared Mahalanobis distance
/// of it, measured with the pivot's covariance. Every input index ends up in
/// exactly one cluster.
///
/// # Errors
/// [`PhdError::SingularMatrix`] if a pivot covariance cannot be inverted.
pub fn cluster_components<T: RealField + Float + Copy>(
    mixture: &GaussianMixture<T>,
    threshold: T,
) -> Result<Vec<Cluster>> {
    let components = mixture.components();
    let mut remaining: Vec<usize> = (0..components.len()).collect();
    let mut clusters = Vec::new();

    while let Some(pivot) = heaviest(components, &remaining) {
        let pivot_component = &components[pivot];
        let pivot_inv = pivot_component
            .covariance()
            .clone()
            .try_inverse()
            .ok_or(PhdError::SingularMatrix {
                context: "merge pivot covariance",
            })?;

        let (members, rest): (Vec<usize>, Vec<usize>) =
            remaining.into_iter().partition(|&i| {
                i == pivot
                    || mahalanobis_distance_squared(
                        components[i].mean(),
                        pivot_component.mean(),
                        &pivot_inv,
                    ) <= threshold
            });

        clusters.push(Cluster { pivot, members });
        remaining = rest;
    }

    Ok(clusters)
}

fn heaviest<T: RealField + Float + Copy>(
    components: &[GaussianComponent<T>],
    indices: &[usize],
) -> Option<usize> {
    indices.iter().copied().fold(None, |best, i| match best {
        Some(b) if components[b].weight() >= components[i].weight() => Some(b),
        _ => Some(i),
    })
}

/// Moment-matches a set of components into one.
///
/// - weight: `w = sum(w_i)`
/// - mean: `mu = sum(w_i * mu_i) / w`
/// - covariance: `sum(w_i * (P_i + (mu - mu_i)(mu - mu_i)^T)) / w`
///
/// Returns `None` if the set is empty or its total weight is not positive.
pub fn merge_cluster<T: RealField + Float + Copy>(
    cluster: &[&GaussianComponent<T>],
) -> Option<GaussianComponent<T>> {
    let first = cluster.first()?;
    let n = first.dim();

    let w_sum = cluster.iter().fold(T::zero(), |acc, c| acc + c.weight());
    if !(w_sum > T::zero()) {
        return None;
    }

    let mean = cluster
        .iter()
        .fold(DVector::<T>::zeros(n), |acc, c| acc + c.mean() * c.weight())
        / w_sum;

    let covariance = cluster.iter().fold(DMatrix::<T>::zeros(n, n), |acc, c| {
        let diff = &mean - c.mean();
        acc + (c.covariance() + &diff * diff.transpose()) * c.weight()
    }) / w_sum;

    Some(GaussianComponent::from_parts(w_sum, mean, covariance))
}

/// Merges nearby components based on Mahalanobis distance.
///
/// See [`cluster_components`] for how clusters are formed. Clusters carrying
/// no weight are dropped.
pub fn merge_clusters<T: RealField + Float + Copy>(
    mixture: &GaussianMixture<T>,
    threshold: T,
) -> Result<GaussianMixture<T>> {
    let components = mixture.components();
    let clusters = cluster_components(mixture, threshold)?;

    Ok(clusters
        .iter()
        .filter_map(|cluster| {
            let members: Vec<_> = cluster.members.iter().map(|&i| &components[i]).collect();
            merge_cluster(&members)
        })
        .collect())
}

/// Rescales weights so they sum to `target_sum`.
///
/// An empty or weightless mixture is returned unchanged.
pub fn normalize_weights<T: RealField + Float + Copy>(
    mixture: GaussianMixture<T>,
    target_sum: T,
) -> GaussianMixture<T> {
    let total = mixture.total_weight();
    if mixture.is_empty() || !(total > T::zero()) {
        return mixture;
    }
    let scale = target_sum / total;
    mixture.iter().map(|c| c.scale_weight(scale)).collect()
}

/// Applies the full pruning pipeline: truncate, merge, cap, renormalize.
///
/// The result carries the same total weight as the components that survived
/// truncation, unless nothing survived.
pub fn prune_and_merge<T: RealField + Float + Copy>(
    mixture: &GaussianMixture<T>,
    config: &PruningConfig<T>,
) -> Result<GaussianMixture<T>> {
    // Step 1: Remove low-weight components
    let survivors = truncate(mixture, config.truncation_threshold);
    let total_before = survivors.total_weight();

    // Step 2: Merge nearby components
    let merged = merge_clusters(&survivors, config.merge_threshold)?;

    // Step 3: Cap the component count
    let kept = cap_components(merged, config.max_components);

    tracing::debug!(
        input = mixture.len(),
        survivors = survivors.len(),
        kept = kept.len(),
        "pruned mixture"
    );

    // Step 4: Restore the surviving mass
    Ok(normalize_weights(kept, total_before))
}
