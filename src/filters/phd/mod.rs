//! Gaussian Mixture Probability Hypothesis Density (GM-PHD) Filter
//!
//! Implementation of the GM-PHD filter for multi-target tracking. Target
//! spawning is not modeled.
//!
//! Each time step runs predict → update → prune/merge as one operation. The
//! stages are pure functions over [`GaussianMixture`]; [`GmPhdFilter`] is the
//! only place the mixture is replaced, and it does so only once every stage
//! has succeeded.
//!
//! Reference: Vo, B.-N., & Ma, W.-K. (2006). "The Gaussian Mixture
//! Probability Hypothesis Density Filter"

mod predict;
mod update;

pub use predict::{predict_birth, predict_existing};
pub use update::update;

use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

use crate::models::{BirthModel, ConstantClutter, LinearObservation, LinearTransition};
use crate::types::gaussian::{GaussianComponent, GaussianMixture};
use crate::utils::{prune_and_merge, PruningConfig};
use crate::{ensure_dim, Result};

// ============================================================================
// GM-PHD Filter
// ============================================================================

/// Complete GM-PHD filter with models and its current mixture.
#[derive(Debug, Clone)]
pub struct GmPhdFilter<T: RealField> {
    transition: LinearTransition<T>,
    observation: LinearObservation<T>,
    clutter: ConstantClutter<T>,
    birth: BirthModel<T>,
    pruning: PruningConfig<T>,
    mixture: GaussianMixture<T>,
    time_step: u64,
}

impl<T: RealField + Float + Copy> GmPhdFilter<T> {
    /// Creates a filter from raw model parameters.
    ///
    /// # Arguments
    /// - `birth_mixture`: fixed birth intensity, used by [`GmPhdFilter::step`]
    /// - `p_survival`: survival probability p_s
    /// - `p_detection`: detection probability p_d
    /// - `f`, `q`: state transition matrix and process noise covariance (n x n)
    /// - `h`: observation matrix (m x n)
    /// - `r`: observation noise covariance (m x m)
    /// - `clutter`: clutter intensity κ
    ///
    /// # Errors
    /// [`crate::PhdError::Dimension`] or [`crate::PhdError::InvalidParameter`]
    /// if any shape or value is inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        birth_mixture: GaussianMixture<T>,
        p_survival: T,
        p_detection: T,
        f: DMatrix<T>,
        q: DMatrix<T>,
        h: DMatrix<T>,
        r: DMatrix<T>,
        clutter: T,
    ) -> Result<Self> {
        Self::from_models(
            LinearTransition::new(f, q, p_survival)?,
            LinearObservation::new(h, r, p_detection)?,
            ConstantClutter::new(clutter)?,
            BirthModel::from_mixture(birth_mixture),
        )
    }

    /// Creates a filter with the specified models and default pruning.
    ///
    /// # Errors
    /// [`crate::PhdError::Dimension`] if the observation matrix or the birth
    /// mixture disagree with the transition model's state dimension.
    pub fn from_models(
        transition: LinearTransition<T>,
        observation: LinearObservation<T>,
        clutter: ConstantClutter<T>,
        birth: BirthModel<T>,
    ) -> Result<Self> {
        let n = transition.state_dim();
        ensure_dim("observation matrix columns", n, observation.state_dim())?;
        birth
            .components()
            .check_dim("configured birth component dimension", n)?;

        Ok(Self {
            transition,
            observation,
            clutter,
            birth,
            pruning: PruningConfig::default(),
            mixture: GaussianMixture::new(),
            time_step: 0,
        })
    }

    /// Replaces the pruning configuration.
    ///
    /// # Errors
    /// [`crate::PhdError::InvalidParameter`] if the configuration is invalid.
    pub fn with_pruning(mut self, pruning: PruningConfig<T>) -> Result<Self> {
        pruning.validate()?;
        self.pruning = pruning;
        Ok(self)
    }

    /// Seeds the filter with a prior mixture.
    ///
    /// # Errors
    /// [`crate::PhdError::Dimension`] if a component has the wrong dimension;
    /// the current mixture is kept in that case.
    pub fn set_mixture(&mut self, mixture: GaussianMixture<T>) -> Result<()> {
        mixture.check_dim("prior component dimension", self.transition.state_dim())?;
        self.mixture = mixture;
        Ok(())
    }

    /// Clears the mixture and the step counter.
    pub fn reset(&mut self) {
        self.mixture = GaussianMixture::new();
        self.time_step = 0;
    }

    /// The current PHD mixture.
    #[inline]
    pub fn mixture(&self) -> &GaussianMixture<T> {
        &self.mixture
    }

    /// Returns the expected number of targets.
    pub fn expected_target_count(&self) -> T {
        self.mixture.total_weight()
    }

    /// Number of successfully completed iterations, saturating at `u64::MAX`.
    #[inline]
    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    #[inline]
    pub fn transition(&self) -> &LinearTransition<T> {
        &self.transition
    }

    #[inline]
    pub fn observation(&self) -> &LinearObservation<T> {
        &self.observation
    }

    #[inline]
    pub fn clutter(&self) -> &ConstantClutter<T> {
        &self.clutter
    }

    #[inline]
    pub fn birth(&self) -> &BirthModel<T> {
        &self.birth
    }

    #[inline]
    pub fn pruning(&self) -> &PruningConfig<T> {
        &self.pruning
    }

    /// Creates one birth hypothesis `(w_b, z, R)` per measurement.
    ///
    /// # Errors
    /// [`crate::PhdError::Dimension`] if state and measurement dimensions
    /// differ or a measurement has the wrong length.
    pub fn create_birth(&self, measurements: &[DVector<T>]) -> Result<Vec<GaussianComponent<T>>> {
        self.birth
            .birth_from_measurements(measurements, &self.observation)
    }

    /// Runs one predict → update → prune/merge cycle.
    ///
    /// `born` are this step's birth hypotheses; they are predicted one step
    /// before being mixed in. On error the mixture keeps its previous value.
    pub fn run_iteration(
        &mut self,
        measurements: &[DVector<T>],
        born: &[GaussianComponent<T>],
    ) -> Result<()> {
        let next = self.next_generation(measurements, born);
        self.commit(next)
    }

    /// Runs one cycle using the configured birth mixture as this step's births.
    pub fn step(&mut self, measurements: &[DVector<T>]) -> Result<()> {
        let next = self.next_generation(measurements, self.birth.components().components());
        self.commit(next)
    }

    fn next_generation(
        &self,
        measurements: &[DVector<T>],
        born: &[GaussianComponent<T>],
    ) -> Result<GaussianMixture<T>> {
        let predicted_birth = predict_birth(born, &self.transition)?;
        let mut predicted = predict_existing(&self.mixture, &self.transition)?;
        predicted.extend(predicted_birth);

        let corrected = update(&predicted, measurements, &self.observation, &self.clutter)?;

        tracing::debug!(
            time_step = self.time_step.saturating_add(1),
            predicted = predicted.len(),
            corrected = corrected.len(),
            measurements = measurements.len(),
            "updated mixture"
        );

        prune_and_merge(&corrected, &self.pruning)
    }

    fn commit(&mut self, next: Result<GaussianMixture<T>>) -> Result<()> {
        match next {
            Ok(mixture) => {
                self.mixture = mixture;
                self.time_step = self.time_step.saturating_add(1);
                tracing::debug!(
                    time_step = self.time_step,
                    components = self.mixture.len(),
                    expected_targets = ?self.expected_target_count(),
                    "completed iteration"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    time_step = self.time_step.saturating_add(1),
                    error = %err,
                    "iteration failed"
                );
                Err(err)
            }
        }
    }
}
