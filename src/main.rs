//! Example usage of the gmphd library
//!
//! Runs a short two-target constant-velocity scenario through the GM-PHD
//! filter. Set `RUST_LOG=gmphd=debug` to see the per-stage mixture sizes.

use gmphd::prelude::*;
use nalgebra::{DMatrix, DVector};
use tracing_subscriber::EnvFilter;

fn diag(values: &[f64]) -> DMatrix<f64> {
    DMatrix::from_diagonal(&DVector::from_column_slice(values))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Create models
    let transition = LinearTransition::constant_velocity_2d(
        1.0,  // Time step
        1.0,  // Process noise (acceleration std)
        0.99, // Survival probability
    )?;
    let observation = LinearObservation::position_sensor_2d(
        5.0, // Measurement noise std
        0.9, // Detection probability
    )?;
    let clutter = ConstantClutter::uniform(
        5.0,           // Expected false alarms per scan
        200.0 * 200.0, // Surveillance area
    )?;

    // Fixed birth model with entry points
    let mut birth = BirthModel::new();
    for (x, y) in [(10.0, 10.0), (190.0, 190.0)] {
        birth.add_component(GaussianComponent::new(
            0.05,
            DVector::from_vec(vec![x, y, 0.0, 0.0]),
            diag(&[100.0, 100.0, 25.0, 25.0]),
        )?);
    }

    let mut filter = GmPhdFilter::from_models(transition, observation, clutter, birth)?
        .with_pruning(PruningConfig::new(1e-4, 4.0, 50)?)?;

    // Initialize with two known targets
    filter.set_mixture(
        [[50.0, 50.0, 2.0, 1.0], [100.0, 100.0, -1.0, 2.0]]
            .into_iter()
            .map(|state| {
                GaussianComponent::new(
                    1.0,
                    DVector::from_column_slice(&state),
                    diag(&[10.0, 10.0, 5.0, 5.0]),
                )
            })
            .collect::<Result<GaussianMixture<f64>>>()?,
    )?;

    tracing::info!(
        components = filter.mixture().len(),
        expected_targets = filter.expected_target_count(),
        "initial state"
    );

    let measurements_per_step = [
        // Detections near both targets + clutter
        vec![[52.0, 51.0], [99.0, 102.0], [150.0, 30.0]],
        // One detection, one miss
        vec![[54.0, 52.0], [45.0, 180.0]],
        vec![[56.0, 53.0], [97.0, 106.0]],
        // Both detected + clutter
        vec![[58.0, 54.0], [95.0, 110.0], [20.0, 20.0], [180.0, 50.0]],
        vec![[60.0, 55.0], [93.0, 114.0]],
    ];

    for scan in &measurements_per_step {
        let measurements: Vec<DVector<f64>> = scan
            .iter()
            .map(|z| DVector::from_column_slice(z))
            .collect();

        filter.step(&measurements)?;

        tracing::info!(
            time_step = filter.time_step(),
            measurements = measurements.len(),
            components = filter.mixture().len(),
            expected_targets = filter.expected_target_count(),
            "filter step"
        );

        for component in filter.mixture().iter().filter(|c| c.weight() >= 0.5) {
            tracing::info!(
                weight = component.weight(),
                x = component.mean()[0],
                y = component.mean()[1],
                "target estimate"
            );
        }
    }

    Ok(())
}
