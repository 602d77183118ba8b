//! Common test helpers for GM-PHD integration tests

#![allow(dead_code)]

use gmphd::filters::phd::GmPhdFilter;
use gmphd::models::{BirthModel, ConstantClutter, LinearObservation, LinearTransition};
use gmphd::types::gaussian::{GaussianComponent, GaussianMixture};
use nalgebra::{DMatrix, DVector};

pub const P_SURVIVAL: f64 = 0.99;
pub const P_DETECTION: f64 = 0.9;
pub const CLUTTER: f64 = 0.01;
pub const BIRTH_WEIGHT: f64 = 0.001;
pub const PROCESS_NOISE: f64 = 0.01;
pub const MEASUREMENT_NOISE: f64 = 0.1;

/// The scalar random-walk filter: n = m = 1, F = H = [1].
pub fn make_scalar_filter() -> GmPhdFilter<f64> {
    make_scalar_filter_with(P_DETECTION, CLUTTER)
}

pub fn make_scalar_filter_with(p_detection: f64, clutter: f64) -> GmPhdFilter<f64> {
    GmPhdFilter::new(
        GaussianMixture::new(),
        P_SURVIVAL,
        p_detection,
        DMatrix::from_element(1, 1, 1.0),
        DMatrix::from_element(1, 1, PROCESS_NOISE),
        DMatrix::from_element(1, 1, 1.0),
        DMatrix::from_element(1, 1, MEASUREMENT_NOISE),
        clutter,
    )
    .unwrap()
}

/// Creates a scalar measurement
pub fn scalar(value: f64) -> DVector<f64> {
    DVector::from_element(1, value)
}

/// Creates a measurement at given position
pub fn make_measurement(x: f64, y: f64) -> DVector<f64> {
    DVector::from_vec(vec![x, y])
}

/// Creates a 2D constant velocity filter with birth locations
pub fn make_cv_filter_with_birth(birth_locations: &[(f64, f64)]) -> GmPhdFilter<f64> {
    let transition = LinearTransition::constant_velocity_2d(1.0, 0.5, 0.99).unwrap();
    let observation = LinearObservation::position_sensor_2d(1.0, 0.9).unwrap();
    let clutter = ConstantClutter::uniform(5.0, 200.0 * 200.0).unwrap();

    let mut birth = BirthModel::new();
    for &(x, y) in birth_locations {
        birth.add_component(
            GaussianComponent::new(
                0.01,
                DVector::from_vec(vec![x, y, 0.0, 0.0]),
                DMatrix::from_diagonal(&DVector::from_vec(vec![100.0, 100.0, 25.0, 25.0])),
            )
            .unwrap(),
        );
    }

    GmPhdFilter::from_models(transition, observation, clutter, birth).unwrap()
}

/// Creates a Gaussian component at given position
pub fn make_component(x: f64, y: f64, vx: f64, vy: f64, weight: f64) -> GaussianComponent<f64> {
    GaussianComponent::new(
        weight,
        DVector::from_vec(vec![x, y, vx, vy]),
        DMatrix::from_diagonal(&DVector::from_vec(vec![10.0, 10.0, 5.0, 5.0])),
    )
    .unwrap()
}
