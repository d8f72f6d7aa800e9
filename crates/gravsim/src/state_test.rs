use approx::assert_abs_diff_eq;
use nalgebra::{Vector2, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::error::{Quantity, SimulationError};
use crate::state::ParticleSystemState;

fn make_test_state(seed: u64) -> ParticleSystemState<3> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    ParticleSystemState::initialize(100, 20.0, &mut rng).unwrap()
}

#[test]
fn test_initialize_sizes() {
    let state = make_test_state(17);

    assert_eq!(state.particle_count(), 100);
    assert_eq!(state.positions().len(), 100);
    assert_eq!(state.velocities().len(), 100);
    assert_eq!(state.accelerations().len(), 100);
    assert_eq!(state.masses().len(), 100);
    assert_eq!(state.dimension(), 3);
    assert_eq!(state.time(), 0.0);
}

#[test]
fn test_initialize_uniform_masses() {
    let state = make_test_state(17);

    for &m in state.masses() {
        assert_eq!(m, 20.0 / 100.0);
    }
    assert_abs_diff_eq!(state.total_mass(), 20.0, epsilon = 1e-12);
}

#[test]
fn test_initialize_zero_accelerations() {
    let state = make_test_state(17);

    assert!(state.accelerations().iter().all(|a| *a == Vector3::zeros()));
}

#[test]
fn test_initialize_momentum_centered() {
    for seed in [0, 1, 17, 234, 9_999] {
        let state = make_test_state(seed);
        let p = state.total_momentum();
        assert!(p.norm() < 1e-12, "seed {}: momentum {:?}", seed, p);
        assert!(state.center_of_mass_velocity().norm() < 1e-12);
    }
}

#[test]
fn test_initialize_momentum_centered_planar() {
    let mut rng = ChaChaRng::seed_from_u64(3);
    let state = ParticleSystemState::<2>::initialize(7, 1.5, &mut rng).unwrap();

    assert_eq!(state.dimension(), 2);
    assert!(state.total_momentum().norm() < 1e-12);
}

#[test]
fn test_initialize_deterministic_for_seed() {
    let a = make_test_state(42);
    let b = make_test_state(42);

    assert_eq!(a, b);
}

#[test]
fn test_initialize_different_seeds_differ() {
    let a = make_test_state(1);
    let b = make_test_state(2);

    assert_ne!(a.positions(), b.positions());
}

#[test]
fn test_independent_generators_do_not_interfere() {
    // Interleaving draws from two generators must not change either result
    let mut rng_a = ChaChaRng::seed_from_u64(5);
    let mut rng_b = ChaChaRng::seed_from_u64(6);
    let a1 = ParticleSystemState::<3>::initialize(10, 1.0, &mut rng_a).unwrap();
    let _b1 = ParticleSystemState::<3>::initialize(10, 1.0, &mut rng_b).unwrap();

    let mut rng_a2 = ChaChaRng::seed_from_u64(5);
    let a2 = ParticleSystemState::<3>::initialize(10, 1.0, &mut rng_a2).unwrap();

    assert_eq!(a1, a2);
}

#[test]
fn test_initialize_positions_look_standard_normal() {
    let mut rng = ChaChaRng::seed_from_u64(17);
    let state = ParticleSystemState::<3>::initialize(5_000, 1.0, &mut rng).unwrap();

    let samples: Vec<f64> = state.positions().iter().flat_map(|x| x.iter().copied()).collect();
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    assert!(mean.abs() < 0.05, "mean {}", mean);
    assert!((var - 1.0).abs() < 0.05, "variance {}", var);
}

#[test]
fn test_initialize_rejects_zero_particles() {
    let mut rng = ChaChaRng::seed_from_u64(0);
    let result = ParticleSystemState::<3>::initialize(0, 1.0, &mut rng);

    assert!(matches!(result, Err(SimulationError::InvalidConfiguration { .. })));
}

#[test]
fn test_initialize_rejects_bad_mass() {
    let mut rng = ChaChaRng::seed_from_u64(0);

    for mass in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let result = ParticleSystemState::<2>::initialize(4, mass, &mut rng);
        assert!(
            matches!(result, Err(SimulationError::InvalidConfiguration { .. })),
            "mass {} accepted",
            mass
        );
    }
}

#[test]
fn test_initialize_rejects_unsupported_dimension() {
    let mut rng = ChaChaRng::seed_from_u64(0);

    assert!(ParticleSystemState::<1>::initialize(4, 1.0, &mut rng).is_err());
    assert!(ParticleSystemState::<4>::initialize(4, 1.0, &mut rng).is_err());
}

#[test]
fn test_from_parts() {
    let state = ParticleSystemState::from_parts(
        vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)],
        vec![Vector2::new(0.0, 1.0), Vector2::new(0.0, -1.0)],
        vec![1.0, 3.0],
    )
    .unwrap();

    assert_eq!(state.particle_count(), 2);
    assert_eq!(state.total_mass(), 4.0);
    assert_eq!(state.total_momentum(), Vector2::new(0.0, -2.0));
    assert_eq!(state.center_of_mass(), Vector2::new(0.5, 0.0));
}

#[test]
fn test_from_parts_length_mismatch() {
    let result = ParticleSystemState::from_parts(
        vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)],
        vec![Vector2::zeros()],
        vec![1.0, 1.0],
    );

    assert!(matches!(result, Err(SimulationError::InvalidConfiguration { .. })));
}

#[test]
fn test_from_parts_rejects_empty_and_bad_values() {
    let empty = ParticleSystemState::<2>::from_parts(vec![], vec![], vec![]);
    assert!(empty.is_err());

    let negative_mass = ParticleSystemState::from_parts(
        vec![Vector2::new(0.0, 0.0)],
        vec![Vector2::zeros()],
        vec![-1.0],
    );
    assert!(negative_mass.is_err());

    let nan_position = ParticleSystemState::from_parts(
        vec![Vector2::new(f64::NAN, 0.0)],
        vec![Vector2::zeros()],
        vec![1.0],
    );
    assert!(nan_position.is_err());
}

#[test]
fn test_first_non_finite() {
    let mut state = ParticleSystemState::from_parts(
        vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)],
        vec![Vector2::zeros(), Vector2::zeros()],
        vec![1.0, 1.0],
    )
    .unwrap();
    assert_eq!(state.first_non_finite(), None);

    state.velocities[1].y = f64::INFINITY;
    assert_eq!(state.first_non_finite(), Some((1, Quantity::Velocity)));

    state.positions[1].x = f64::NAN;
    assert_eq!(state.first_non_finite(), Some((1, Quantity::Position)));
}
