use approx::assert_abs_diff_eq;
use nalgebra::Vector2;

use crate::energy::compute_energy;
use crate::error::{Quantity, SimulationError};
use crate::forces::{DirectSummation, ForceKernel, Gravity};
use crate::integrator::{Euler, Integrator, Leapfrog, refresh_accelerations};
use crate::state::ParticleSystemState;

/// Two unit masses on a circular mutual orbit of separation 2
///
/// Relative orbit: μ = G (m1 + m2) = 2, r = 2, so each body moves at 0.5
/// and the period is 4π.
fn make_binary() -> (ParticleSystemState<2>, DirectSummation) {
    let force = DirectSummation::new(Gravity::plummer(1.0, 1e-4));
    let mut state = ParticleSystemState::from_parts(
        vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)],
        vec![Vector2::new(0.0, -0.5), Vector2::new(0.0, 0.5)],
        vec![1.0, 1.0],
    )
    .unwrap();
    refresh_accelerations(&mut state, &force);
    (state, force)
}

fn total_energy(state: &ParticleSystemState<2>, force: &DirectSummation) -> f64 {
    compute_energy(state, <DirectSummation as ForceKernel<2>>::gravity(force)).total
}

#[test]
fn test_leapfrog_advances_time() {
    let (mut state, force) = make_binary();

    assert_eq!(state.time(), 0.0);
    Leapfrog.step(&mut state, 0.01, &force).unwrap();

    assert!((state.time() - 0.01).abs() < 1e-15);
}

#[test]
fn test_leapfrog_changes_position() {
    let (mut state, force) = make_binary();
    let initial = state.positions()[0];

    Leapfrog.step(&mut state, 0.01, &force).unwrap();

    assert!((state.positions()[0] - initial).norm() > 0.0);
}

#[test]
fn test_leapfrog_step_sequence() {
    // One hand-computed kick-drift-kick step
    let (mut state, force) = make_binary();
    let dt = 0.1;
    let a0 = state.accelerations().to_vec();
    let v0 = state.velocities().to_vec();
    let x0 = state.positions().to_vec();

    Leapfrog.step(&mut state, dt, &force).unwrap();

    let v_half: Vec<_> = v0.iter().zip(&a0).map(|(v, a)| v + a * (dt / 2.0)).collect();
    let x1: Vec<_> = x0.iter().zip(&v_half).map(|(x, v)| x + v * dt).collect();
    let a1 = force.accelerations(&x1, state.masses());
    let v1: Vec<_> = v_half.iter().zip(&a1).map(|(v, a)| v + a * (dt / 2.0)).collect();

    assert_eq!(state.positions(), x1.as_slice());
    assert_eq!(state.accelerations(), a1.as_slice());
    assert_eq!(state.velocities(), v1.as_slice());
}

#[test]
fn test_leapfrog_circular_orbit() {
    let (mut state, force) = make_binary();
    let initial_separation = (state.positions()[1] - state.positions()[0]).norm();

    // One full period, 2000 steps
    let period = 4.0 * std::f64::consts::PI;
    let n_steps = 2_000;
    Leapfrog
        .integrate(&mut state, period / n_steps as f64, n_steps, &force)
        .unwrap();

    let final_separation = (state.positions()[1] - state.positions()[0]).norm();
    let error = (final_separation - initial_separation).abs() / initial_separation;
    assert!(error < 1e-3, "Separation error: {:.2e}", error);
}

#[test]
fn test_leapfrog_conserves_energy() {
    let (mut state, force) = make_binary();
    let initial = total_energy(&state, &force);

    Leapfrog.integrate(&mut state, 0.01, 1_000, &force).unwrap();

    let error = (total_energy(&state, &force) - initial).abs() / initial.abs();
    assert!(error < 1e-4, "Energy error: {:.2e}", error);
}

#[test]
fn test_leapfrog_conserves_momentum() {
    let (mut state, force) = make_binary();

    Leapfrog.integrate(&mut state, 0.01, 1_000, &force).unwrap();

    assert!(state.total_momentum().norm() < 1e-12);
}

#[test]
fn test_leapfrog_time_reversible() {
    let (mut state, force) = make_binary();
    let x0 = state.positions().to_vec();

    Leapfrog.integrate(&mut state, 0.01, 200, &force).unwrap();
    Leapfrog.integrate(&mut state, -0.01, 200, &force).unwrap();

    for (x, x_start) in state.positions().iter().zip(&x0) {
        assert!((x - x_start).norm() < 1e-10);
    }
    assert_abs_diff_eq!(state.time(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_euler_advances_time() {
    let (mut state, force) = make_binary();

    Euler.step(&mut state, 0.01, &force).unwrap();

    assert!((state.time() - 0.01).abs() < 1e-15);
}

#[test]
fn test_euler_worse_than_leapfrog() {
    let (mut euler_state, force) = make_binary();
    let (mut leapfrog_state, _) = make_binary();
    let initial = total_energy(&euler_state, &force);

    Euler.integrate(&mut euler_state, 0.01, 10_000, &force).unwrap();
    Leapfrog.integrate(&mut leapfrog_state, 0.01, 10_000, &force).unwrap();

    let euler_error = (total_energy(&euler_state, &force) - initial).abs() / initial.abs();
    let leapfrog_error = (total_energy(&leapfrog_state, &force) - initial).abs() / initial.abs();

    assert!(euler_error > leapfrog_error);
    assert!(euler_error > 0.05, "Euler error only {:.2e}", euler_error);
    assert!(leapfrog_error < 1e-3, "Leapfrog error {:.2e}", leapfrog_error);
}

#[test]
fn test_euler_energy_grows_monotonically() {
    let (mut state, force) = make_binary();
    let mut previous = total_energy(&state, &force);

    for _ in 0..20 {
        Euler.integrate(&mut state, 0.01, 500, &force).unwrap();
        let current = total_energy(&state, &force);
        assert!(current > previous, "energy fell from {} to {}", previous, current);
        previous = current;
    }
}

#[test]
fn test_multi_step_integration() {
    let (mut state, force) = make_binary();
    let dt = 0.01;
    let n_steps = 50;

    let final_time = Leapfrog.integrate(&mut state, dt, n_steps, &force).unwrap();

    let expected_time = dt * (n_steps as f64);
    assert!((final_time - expected_time).abs() < 1e-10);
    assert!((state.time() - expected_time).abs() < 1e-10);
}

#[test]
fn test_small_timestep_more_accurate() {
    let (mut small, force) = make_binary();
    let (mut large, _) = make_binary();
    let initial = total_energy(&small, &force);

    Leapfrog.integrate(&mut small, 0.001, 2_000, &force).unwrap();
    Leapfrog.integrate(&mut large, 0.1, 20, &force).unwrap();

    let error_small = (total_energy(&small, &force) - initial).abs();
    let error_large = (total_energy(&large, &force) - initial).abs();

    assert!(error_small < error_large);
}

#[test]
fn test_non_finite_state_is_reported() {
    let (mut state, force) = make_binary();
    state.velocities[1].x = f64::NAN;

    let result = Leapfrog.step(&mut state, 0.01, &force);

    match result {
        Err(SimulationError::NumericalInstability { particle, quantity, time }) => {
            assert_eq!(quantity, Quantity::Position);
            assert_eq!(particle, 1);
            assert_abs_diff_eq!(time, 0.01);
        }
        other => panic!("expected instability, got {:?}", other),
    }
}

#[test]
fn test_integrate_stops_at_first_error() {
    let (mut state, force) = make_binary();
    state.positions[0].y = f64::INFINITY;

    let result = Euler.integrate(&mut state, 0.01, 100, &force);

    assert!(result.is_err());
    assert_abs_diff_eq!(state.time(), 0.01);
}
