//! Time integration for N-body systems
//!
//! The primary integrator is the symplectic kick-drift-kick leapfrog, whose
//! energy error stays bounded over long runs instead of drifting. An
//! explicit Euler integrator is kept alongside it as a comparison baseline.

use crate::error::{Result, SimulationError};
use crate::forces::ForceKernel;
use crate::state::ParticleSystemState;

/// A fixed-step time integrator
///
/// Integrators read the cached accelerations in the state, advance
/// positions and velocities, refresh the cache through the force kernel
/// and advance the clock by `dt`.
pub trait Integrator<const D: usize>: Send + Sync {
    /// Advance the state by one timestep
    ///
    /// Returns `NumericalInstability` if any position, velocity or
    /// acceleration is NaN or infinite once the step is done.
    ///
    /// # Arguments
    ///
    /// * `state` - Current state (modified in place)
    /// * `dt` - Timestep
    /// * `force` - Kernel used to refresh accelerations
    fn step(&self, state: &mut ParticleSystemState<D>, dt: f64, force: &dyn ForceKernel<D>) -> Result<()>;

    /// Advance the state by multiple timesteps, stopping at the first error
    ///
    /// # Returns
    ///
    /// Final time after integration
    fn integrate(
        &self,
        state: &mut ParticleSystemState<D>,
        dt: f64,
        n_steps: usize,
        force: &dyn ForceKernel<D>,
    ) -> Result<f64> {
        for _ in 0..n_steps {
            self.step(state, dt, force)?;
        }
        Ok(state.time)
    }
}

/// Overwrite the cached accelerations from the current positions
pub fn refresh_accelerations<const D: usize>(state: &mut ParticleSystemState<D>, force: &dyn ForceKernel<D>) {
    force.compute_accelerations(&state.positions, &state.masses, &mut state.accelerations);
}

fn check_finite<const D: usize>(state: &ParticleSystemState<D>) -> Result<()> {
    match state.first_non_finite() {
        None => Ok(()),
        Some((particle, quantity)) => Err(SimulationError::NumericalInstability {
            time: state.time,
            particle,
            quantity,
        }),
    }
}

/// Symplectic leapfrog integrator (2nd order, kick-drift-kick)
///
/// 1. Kick: v(t + dt/2) = v(t) + a(t) * dt/2
/// 2. Drift: x(t + dt) = x(t) + v(t + dt/2) * dt
/// 3. Recompute a(t + dt) from x(t + dt)
/// 4. Kick: v(t + dt) = v(t + dt/2) + a(t + dt) * dt/2
/// 5. t += dt
///
/// Only one force evaluation per step: the acceleration cached at the end
/// of a step is the a(t) of the next one. The cache must therefore hold the
/// accelerations of the current positions before the first step.
///
/// # Examples
///
/// ```
/// use gravsim::forces::{DirectSummation, Gravity};
/// use gravsim::integrator::{refresh_accelerations, Integrator, Leapfrog};
/// use gravsim::state::ParticleSystemState;
/// use nalgebra::Vector2;
///
/// let mut state = ParticleSystemState::from_parts(
///     vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)],
///     vec![Vector2::new(0.0, -0.5), Vector2::new(0.0, 0.5)],
///     vec![1.0, 1.0],
/// )
/// .unwrap();
/// let force = DirectSummation::new(Gravity::plummer(1.0, 0.01));
/// refresh_accelerations(&mut state, &force);
///
/// Leapfrog.step(&mut state, 0.01, &force).unwrap();
/// assert!((state.time() - 0.01).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Leapfrog;

impl Leapfrog {
    fn kick<const D: usize>(state: &mut ParticleSystemState<D>, dt_half: f64) {
        state
            .velocities
            .iter_mut()
            .zip(state.accelerations.iter())
            .for_each(|(v, a)| *v += a * dt_half);
    }

    fn drift<const D: usize>(state: &mut ParticleSystemState<D>, dt: f64) {
        state
            .positions
            .iter_mut()
            .zip(state.velocities.iter())
            .for_each(|(x, v)| *x += v * dt);
    }
}

impl<const D: usize> Integrator<D> for Leapfrog {
    fn step(&self, state: &mut ParticleSystemState<D>, dt: f64, force: &dyn ForceKernel<D>) -> Result<()> {
        let dt_half = dt / 2.0;

        Self::kick(state, dt_half);
        Self::drift(state, dt);
        refresh_accelerations(state, force);
        Self::kick(state, dt_half);

        state.time += dt;
        check_finite(state)
    }
}

/// Explicit Euler integrator (1st order, for comparison only)
///
/// Moves positions with the old velocities and velocities with the old
/// accelerations. Not symplectic: the energy error grows steadily, which is
/// what makes it a useful differential baseline for [`Leapfrog`].
///
/// **Do not use for production runs.**
#[derive(Debug, Clone, Copy, Default)]
pub struct Euler;

impl<const D: usize> Integrator<D> for Euler {
    fn step(&self, state: &mut ParticleSystemState<D>, dt: f64, force: &dyn ForceKernel<D>) -> Result<()> {
        state
            .positions
            .iter_mut()
            .zip(state.velocities.iter_mut())
            .zip(state.accelerations.iter())
            .for_each(|((x, v), a)| {
                *x += *v * dt;
                *v += a * dt;
            });
        refresh_accelerations(state, force);

        state.time += dt;
        check_finite(state)
    }
}
