//! GM-PHD measurement update
//!
//! Corrects a predicted mixture against a measurement set. Every predicted
//! component yields one missed-detection term plus one detection term per
//! measurement; detection terms competing for the same measurement are
//! normalized jointly against the clutter intensity.

use nalgebra::{DMatrix, DVector, RealField};
use num_traits::Float;

use crate::models::{ConstantClutter, LinearObservation};
use crate::types::gaussian::{FactoredCovariance, GaussianComponent, GaussianMixture};
use crate::types::transforms::{
    compute_innovation_covariance, compute_kalman_gain, observe, simple_covariance_update,
};
use crate::{ensure_dim, PhdError, Result};

/// Per-component Kalman terms, shared by every measurement.
#[derive(Debug, Clone)]
struct UpdateTerms<T: RealField> {
    /// eta = H * m
    predicted_meas: DVector<T>,
    /// S = R + H * P * H^T, factored once
    innovation: FactoredCovariance<T>,
    /// K = P * H^T * S^{-1}
    kalman_gain: DMatrix<T>,
    /// (I - K * H) * P
    posterior_cov: DMatrix<T>,
}

impl<T: RealField + Float + Copy> UpdateTerms<T> {
    fn new(component: &GaussianComponent<T>, observation: &LinearObservation<T>) -> Result<Self> {
        let h = observation.observation_matrix();
        let innovation_cov =
            compute_innovation_covariance(component.covariance(), h, observation.measurement_noise());
        let innovation = FactoredCovariance::new(&innovation_cov, "innovation covariance")?;
        let kalman_gain = compute_kalman_gain(component.covariance(), h, &innovation);
        let posterior_cov = simple_covariance_update(component.covariance(), &kalman_gain, h);

        Ok(Self {
            predicted_meas: observe(h, component.mean()),
            innovation,
            kalman_gain,
            posterior_cov,
        })
    }
}

/// Updates the PHD with a set of measurements.
///
/// The output holds exactly `predicted.len() * (1 + measurements.len())`
/// components: the missed-detection terms first, then the detection terms
/// grouped by measurement. Zero-weight terms are kept; truncation is left to
/// pruning.
///
/// # Errors
/// - [`PhdError::Dimension`] if a measurement's length is not `m`, or a
///   predicted component's dimension is not `n`
/// - [`PhdError::SingularMatrix`] if an innovation covariance is not positive
///   definite
/// - [`PhdError::DegenerateNormalization`] if κ = 0 and every detection
///   weight for some measurement is zero
pub fn update<T: RealField + Float + Copy>(
    predicted: &GaussianMixture<T>,
    measurements: &[DVector<T>],
    observation: &LinearObservation<T>,
    clutter: &ConstantClutter<T>,
) -> Result<GaussianMixture<T>> {
    let m = observation.measurement_dim();
    for z in measurements {
        ensure_dim("measurement length", m, z.len())?;
    }
    predicted.check_dim("predicted component dimension", observation.state_dim())?;

    let p_d = observation.detection_probability();
    let kappa = clutter.intensity();

    // Pre-compute per-component data
    let terms = predicted
        .iter()
        .map(|c| UpdateTerms::new(c, observation))
        .collect::<Result<Vec<_>>>()?;

    let mut updated = GaussianMixture::with_capacity(predicted.len() * (measurements.len() + 1));

    // Missed detection components
    let missed = T::one() - p_d;
    updated.extend(predicted.iter().map(|c| c.scale_weight(missed)));

    if predicted.is_empty() {
        return Ok(updated);
    }

    // Detection components (one for each component-measurement pair)
    for (index, z) in measurements.iter().enumerate() {
        let detection_weights = predicted
            .iter()
            .zip(&terms)
            .map(|(c, t)| {
                let likelihood = t.innovation.density(z, &t.predicted_meas)?;
                Ok(p_d * c.weight() * likelihood)
            })
            .collect::<Result<Vec<T>>>()?;

        let weight_sum = detection_weights
            .iter()
            .fold(T::zero(), |acc, &w| acc + w);
        let normalizer = kappa + weight_sum;
        if !(normalizer > T::zero()) {
            return Err(PhdError::DegenerateNormalization { measurement: index });
        }

        tracing::trace!(
            measurement = index,
            weight_sum = ?weight_sum,
            normalizer = ?normalizer,
            "normalized detection weights"
        );

        for ((c, t), w) in predicted.iter().zip(&terms).zip(detection_weights) {
            let innovation = z - &t.predicted_meas;
            let mean = c.mean() + &t.kalman_gain * innovation;
            updated.push(GaussianComponent::from_parts(
                w / normalizer,
                mean,
                t.posterior_cov.clone(),
            ));
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn scalar_sensor(p_d: f64) -> LinearObservation<f64> {
        LinearObservation::new(
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, 0.1),
            p_d,
        )
        .unwrap()
    }

    fn scalar(weight: f64, mean: f64, var: f64) -> GaussianComponent<f64> {
        GaussianComponent::new(
            weight,
            DVector::from_element(1, mean),
            DMatrix::from_element(1, 1, var),
        )
        .unwrap()
    }

    fn z(value: f64) -> DVector<f64> {
        DVector::from_element(1, value)
    }

    fn npdf(x: f64, mu: f64, var: f64) -> f64 {
        (-0.5 * (x - mu) * (x - mu) / var).exp() / (2.0 * PI * var).sqrt()
    }

    #[test]
    fn test_update_output_size() {
        let predicted = GaussianMixture::from_components(vec![
            scalar(0.5, 0.0, 1.0),
            scalar(0.3, 4.0, 1.0),
            scalar(0.2, 9.0, 1.0),
        ]);
        let measurements = vec![z(0.1), z(4.2)];
        let clutter = ConstantClutter::new(0.01).unwrap();

        let updated = update(&predicted, &measurements, &scalar_sensor(0.9), &clutter).unwrap();

        assert_eq!(updated.len(), 3 * (1 + 2));
    }

    #[test]
    fn test_update_without_measurements_scales_by_missed_detection() {
        let predicted = GaussianMixture::from_components(vec![
            scalar(0.5, 0.0, 1.0),
            scalar(0.25, 3.0, 2.0),
        ]);
        let clutter = ConstantClutter::new(0.01).unwrap();

        let updated = update(&predicted, &[], &scalar_sensor(0.9), &clutter).unwrap();

        assert_eq!(updated.len(), 2);
        for (before, after) in predicted.iter().zip(updated.iter()) {
            assert_relative_eq!(after.weight(), before.weight() * 0.1, epsilon = 1e-12);
            assert_eq!(after.mean(), before.mean());
            assert_eq!(after.covariance(), before.covariance());
        }
    }

    #[test]
    fn test_update_zero_detection_probability() {
        let predicted = GaussianMixture::from_components(vec![scalar(1.0, 0.0, 1.0)]);
        let clutter = ConstantClutter::new(0.5).unwrap();

        let updated = update(&predicted, &[z(0.0), z(1.0)], &scalar_sensor(0.0), &clutter).unwrap();

        assert_eq!(updated.len(), 3);
        assert_relative_eq!(updated.components()[0].weight(), 1.0);
        for detection in &updated.components()[1..] {
            assert_eq!(detection.weight(), 0.0);
        }
    }

    #[test]
    fn test_update_single_component_weights() {
        let predicted = GaussianMixture::from_components(vec![scalar(0.8, 1.0, 0.5)]);
        let clutter = ConstantClutter::new(0.05).unwrap();

        let updated = update(&predicted, &[z(1.5)], &scalar_sensor(0.9), &clutter).unwrap();

        let s = 0.5 + 0.1;
        let raw = 0.9 * 0.8 * npdf(1.5, 1.0, s);
        let k = 0.5 / s;

        let detection = &updated.components()[1];
        assert_relative_eq!(detection.weight(), raw / (0.05 + raw), epsilon = 1e-12);
        assert_relative_eq!(detection.mean()[0], 1.0 + k * 0.5, epsilon = 1e-12);
        assert_relative_eq!(detection.covariance()[(0, 0)], (1.0 - k) * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_update_normalizes_per_measurement() {
        let predicted = GaussianMixture::from_components(vec![
            scalar(0.6, 0.0, 1.0),
            scalar(0.4, 2.0, 1.0),
        ]);
        let clutter = ConstantClutter::new(0.02).unwrap();
        let measurements = vec![z(0.2), z(1.8)];

        let updated = update(&predicted, &measurements, &scalar_sensor(0.95), &clutter).unwrap();

        let s = 1.1;
        for (i, meas) in [0.2, 1.8].iter().enumerate() {
            let raw: Vec<f64> = [(0.6, 0.0), (0.4, 2.0)]
                .iter()
                .map(|&(w, mu)| 0.95 * w * npdf(*meas, mu, s))
                .collect();
            let denom = 0.02 + raw.iter().sum::<f64>();
            let block = &updated.components()[2 + 2 * i..4 + 2 * i];
            assert_relative_eq!(block[0].weight(), raw[0] / denom, epsilon = 1e-12);
            assert_relative_eq!(block[1].weight(), raw[1] / denom, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_update_empty_prediction() {
        let clutter = ConstantClutter::new(0.0).unwrap();
        let updated =
            update(&GaussianMixture::new(), &[z(1.0)], &scalar_sensor(0.9), &clutter).unwrap();
        assert!(updated.is_empty());
    }

    #[test]
    fn test_update_rejects_wrong_measurement_length() {
        let predicted = GaussianMixture::from_components(vec![scalar(1.0, 0.0, 1.0)]);
        let clutter = ConstantClutter::new(0.01).unwrap();
        let bad = DVector::from_vec(vec![1.0, 2.0]);

        let err = update(&predicted, &[bad], &scalar_sensor(0.9), &clutter).unwrap_err();
        assert_eq!(
            err,
            PhdError::Dimension {
                context: "measurement length",
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_update_degenerate_normalization() {
        let predicted = GaussianMixture::from_components(vec![scalar(1.0, 0.0, 1.0)]);
        let clutter = ConstantClutter::new(0.0).unwrap();

        let err = update(&predicted, &[z(0.0)], &scalar_sensor(0.0), &clutter).unwrap_err();
        assert_eq!(err, PhdError::DegenerateNormalization { measurement: 0 });
    }

    #[test]
    fn test_update_singular_innovation() {
        let sensor = LinearObservation::new(
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, 0.0),
            0.9,
        )
        .unwrap();
        let predicted = GaussianMixture::from_components(vec![scalar(1.0, 0.0, 0.0)]);
        let clutter = ConstantClutter::new(0.01).unwrap();

        let err = update(&predicted, &[z(0.0)], &sensor, &clutter).unwrap_err();
        assert!(matches!(err, PhdError::SingularMatrix { .. }));
    }

    #[test]
    fn test_update_correlated_terms_shared_across_measurements() {
        let sensor = LinearObservation::new(
            DMatrix::identity(2, 2),
            DMatrix::from_row_slice(2, 2, &[0.5, 0.1, 0.1, 0.4]),
            0.9,
        )
        .unwrap();
        let p = DMatrix::from_row_slice(2, 2, &[2.0, 0.3, 0.3, 1.0]);
        let predicted = GaussianMixture::from_components(vec![GaussianComponent::new(
            0.7,
            DVector::from_vec(vec![1.0, -1.0]),
            p.clone(),
        )
        .unwrap()]);
        let clutter = ConstantClutter::new(0.01).unwrap();
        let measurements = vec![
            DVector::from_vec(vec![1.5, -0.5]),
            DVector::from_vec(vec![0.0, -2.0]),
        ];

        let updated = update(&predicted, &measurements, &sensor, &clutter).unwrap();

        let s = &p + sensor.measurement_noise();
        let s_inv = s.clone().try_inverse().unwrap();
        let det = s.determinant();
        let k = &p * &s_inv;
        for (j, zj) in measurements.iter().enumerate() {
            let d = zj - predicted.components()[0].mean();
            let mahal = (d.transpose() * &s_inv * &d)[(0, 0)];
            let likelihood = (-0.5 * mahal).exp() / (2.0 * PI * det.sqrt());
            let raw = 0.9 * 0.7 * likelihood;

            let detection = &updated.components()[1 + j];
            assert_relative_eq!(detection.weight(), raw / (0.01 + raw), epsilon = 1e-12);

            let mean = predicted.components()[0].mean() + &k * &d;
            assert_relative_eq!(detection.mean()[0], mean[0], epsilon = 1e-12);
            assert_relative_eq!(detection.mean()[1], mean[1], epsilon = 1e-12);
        }
        assert_eq!(updated.components()[1].covariance(), updated.components()[2].covariance());
    }
}
