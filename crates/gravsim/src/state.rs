use nalgebra::SVector;
use rand::Rng;
use rand_chacha::ChaChaRng;
use rand_distr::StandardNormal;

use crate::error::{Quantity, Result, SimulationError};

/// Per-particle vector in D dimensions
pub type Vector<const D: usize> = SVector<f64, D>;

/// Complete state of an N-body particle system at a given time
///
/// Particles are identified by their index, which never changes. The four
/// per-particle arrays always have the same length, and nothing outside the
/// crate can resize or write them: the integrator is the only mutator.
///
/// The acceleration buffer is a cache rewritten in place by every step.
/// Copy values out (see [`crate::driver::Snapshot`]) rather than holding on
/// to them across a step.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystemState<const D: usize> {
    pub(crate) positions: Vec<Vector<D>>,
    pub(crate) velocities: Vec<Vector<D>>,
    pub(crate) accelerations: Vec<Vector<D>>,
    pub(crate) masses: Vec<f64>,
    pub(crate) time: f64,
}

impl<const D: usize> ParticleSystemState<D> {
    /// Creates a randomly initialized, momentum-centered system
    ///
    /// Positions and velocities are drawn from a standard normal
    /// distribution (all positions first, then all velocities), every
    /// particle gets `total_mass / particle_count`, and the mass-weighted
    /// mean velocity is subtracted so the total momentum starts at zero.
    /// Accelerations start zeroed and time at 0.
    ///
    /// # Arguments
    ///
    /// * `particle_count` - Number of particles N
    /// * `total_mass` - Total mass M
    /// * `rng` - Generator owned by the caller; the same seed gives the same system
    ///
    /// # Examples
    ///
    /// ```
    /// use gravsim::state::ParticleSystemState;
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaChaRng;
    ///
    /// let mut rng = ChaChaRng::seed_from_u64(17);
    /// let state = ParticleSystemState::<3>::initialize(100, 20.0, &mut rng).unwrap();
    ///
    /// assert_eq!(state.particle_count(), 100);
    /// assert!((state.total_mass() - 20.0).abs() < 1e-12);
    /// assert!(state.total_momentum().norm() < 1e-12);
    /// ```
    pub fn initialize(particle_count: usize, total_mass: f64, rng: &mut ChaChaRng) -> Result<Self> {
        check_dimension::<D>()?;
        if particle_count == 0 {
            return Err(SimulationError::invalid("particle count must be positive"));
        }
        if !(total_mass.is_finite() && total_mass > 0.0) {
            return Err(SimulationError::invalid("total mass must be positive and finite"));
        }

        let positions: Vec<Vector<D>> = (0..particle_count)
            .map(|_| sample_standard_normal(rng))
            .collect();
        let velocities: Vec<Vector<D>> = (0..particle_count)
            .map(|_| sample_standard_normal(rng))
            .collect();
        let masses = vec![total_mass / particle_count as f64; particle_count];

        let mut state = Self {
            accelerations: vec![Vector::zeros(); particle_count],
            positions,
            velocities,
            masses,
            time: 0.0,
        };
        state.remove_bulk_motion();
        Ok(state)
    }

    /// Creates a system from explicit initial conditions
    ///
    /// Velocities are taken as given (no momentum centering), accelerations
    /// start zeroed and time at 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use gravsim::state::ParticleSystemState;
    /// use nalgebra::Vector2;
    ///
    /// let state = ParticleSystemState::from_parts(
    ///     vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)],
    ///     vec![Vector2::zeros(), Vector2::zeros()],
    ///     vec![1.0, 1.0],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(state.particle_count(), 2);
    /// ```
    pub fn from_parts(
        positions: Vec<Vector<D>>,
        velocities: Vec<Vector<D>>,
        masses: Vec<f64>,
    ) -> Result<Self> {
        check_dimension::<D>()?;
        let n = positions.len();
        if n == 0 {
            return Err(SimulationError::invalid("particle count must be positive"));
        }
        if velocities.len() != n || masses.len() != n {
            return Err(SimulationError::invalid(format!(
                "length mismatch: {} positions, {} velocities, {} masses",
                n,
                velocities.len(),
                masses.len()
            )));
        }
        if let Some(i) = masses.iter().position(|m| !(m.is_finite() && *m > 0.0)) {
            return Err(SimulationError::invalid(format!(
                "mass of particle {i} must be positive and finite"
            )));
        }
        let all_finite = positions.iter().chain(velocities.iter()).all(|v| is_finite(v));
        if !all_finite {
            return Err(SimulationError::invalid("initial positions and velocities must be finite"));
        }

        Ok(Self {
            accelerations: vec![Vector::zeros(); n],
            positions,
            velocities,
            masses,
            time: 0.0,
        })
    }

    pub fn positions(&self) -> &[Vector<D>] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vector<D>] {
        &self.velocities
    }

    /// Accelerations from the most recent force evaluation
    pub fn accelerations(&self) -> &[Vector<D>] {
        &self.accelerations
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the number of particles
    pub fn particle_count(&self) -> usize {
        self.masses.len()
    }

    /// Spatial dimension of every particle vector
    pub fn dimension(&self) -> usize {
        D
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Returns the total momentum of all particles
    ///
    /// Zero at t = 0 for a randomly initialized system, and conserved by
    /// pairwise gravity up to rounding.
    pub fn total_momentum(&self) -> Vector<D> {
        self.velocities
            .iter()
            .zip(&self.masses)
            .fold(Vector::zeros(), |acc, (v, m)| acc + v * *m)
    }

    /// Mass-weighted mean velocity
    pub fn center_of_mass_velocity(&self) -> Vector<D> {
        self.total_momentum() / self.total_mass()
    }

    /// Mass-weighted mean position
    pub fn center_of_mass(&self) -> Vector<D> {
        let weighted = self
            .positions
            .iter()
            .zip(&self.masses)
            .fold(Vector::zeros(), |acc, (x, m)| acc + x * *m);
        weighted / self.total_mass()
    }

    /// First particle (by index) holding a NaN or infinite component
    ///
    /// Positions are checked before velocities, velocities before
    /// accelerations.
    pub fn first_non_finite(&self) -> Option<(usize, Quantity)> {
        let find = |values: &[Vector<D>], quantity: Quantity| {
            values
                .iter()
                .position(|v| !is_finite(v))
                .map(|i| (i, quantity))
        };
        find(&self.positions, Quantity::Position)
            .or_else(|| find(&self.velocities, Quantity::Velocity))
            .or_else(|| find(&self.accelerations, Quantity::Acceleration))
    }

    /// Subtracts the center-of-mass velocity from every particle
    fn remove_bulk_motion(&mut self) {
        let drift = self.center_of_mass_velocity();
        self.velocities.iter_mut().for_each(|v| *v -= drift);
    }
}

fn check_dimension<const D: usize>() -> Result<()> {
    if matches!(D, 2 | 3) {
        Ok(())
    } else {
        Err(SimulationError::invalid(format!("dimension must be 2 or 3, got {D}")))
    }
}

fn sample_standard_normal<const D: usize>(rng: &mut ChaChaRng) -> Vector<D> {
    Vector::from_fn(|_, _| rng.sample(StandardNormal))
}

fn is_finite<const D: usize>(v: &Vector<D>) -> bool {
    v.iter().all(|c| c.is_finite())
}
