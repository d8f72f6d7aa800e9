//! Run configuration for a simulation.
//!
//! Every value here is fixed for the lifetime of a `Simulation`: the driver
//! copies what it needs at construction and exposes no setters afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::forces::SofteningLaw;

/// Which force kernel implementation to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceBackend {
    /// Reference O(N²) double loop
    #[default]
    Direct,
    /// Direct loop split across the rayon thread pool by particle
    Parallel,
    /// Each unordered pair evaluated once (Newton's third law)
    Symmetric,
}

/// Which time integrator advances the state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// Kick-drift-kick leapfrog (symplectic)
    #[default]
    Leapfrog,
    /// Explicit Euler, for comparison only
    Euler,
}

/// Configuration for a simulation run.
///
/// # Builder Pattern
/// ```
/// use gravsim::config::{ForceBackend, SimulationConfig};
///
/// let config = SimulationConfig::new()
///     .with_particle_count(10)
///     .with_dimension(2)
///     .with_softening(0.1)
///     .with_backend(ForceBackend::Parallel)
///     .with_seed(42);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of particles N. Default: 100.
    pub particle_count: usize,
    /// Spatial dimension, 2 or 3. Default: 3.
    pub dimension: usize,
    /// Total mass M shared equally between particles. Default: 20.0.
    pub total_mass: f64,
    /// Fixed time step. Default: 0.01.
    pub dt: f64,
    /// Gravitational constant G. Default: 1.0.
    #[serde(alias = "g")]
    pub gravitational_constant: f64,
    /// Softening length epsilon. Default: 0.1.
    #[serde(alias = "epsilon")]
    pub softening: f64,
    /// Seed for the initial-condition generator. Default: 17.
    pub seed: u64,
    /// Softening convention for force and potential. Default: Plummer.
    pub softening_law: SofteningLaw,
    /// Force kernel implementation. Default: direct.
    pub backend: ForceBackend,
    /// Time integrator. Default: leapfrog.
    pub integrator: IntegratorKind,
}

impl SimulationConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SimulationConfig {
            particle_count: 100,
            dimension: 3,
            total_mass: 20.0,
            dt: 0.01,
            gravitational_constant: 1.0,
            softening: 0.1,
            seed: 17,
            softening_law: SofteningLaw::Plummer,
            backend: ForceBackend::Direct,
            integrator: IntegratorKind::Leapfrog,
        }
    }

    pub fn with_particle_count(mut self, particle_count: usize) -> Self {
        self.particle_count = particle_count;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_total_mass(mut self, total_mass: f64) -> Self {
        self.total_mass = total_mass;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_gravitational_constant(mut self, g: f64) -> Self {
        self.gravitational_constant = g;
        self
    }

    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_softening_law(mut self, law: SofteningLaw) -> Self {
        self.softening_law = law;
        self
    }

    pub fn with_backend(mut self, backend: ForceBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = integrator;
        self
    }

    /// Check every value against its allowed range.
    ///
    /// Returns `InvalidConfiguration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(SimulationError::invalid("particle count must be positive"));
        }
        if !matches!(self.dimension, 2 | 3) {
            return Err(SimulationError::invalid(format!(
                "dimension must be 2 or 3, got {}",
                self.dimension
            )));
        }
        if !(self.total_mass.is_finite() && self.total_mass > 0.0) {
            return Err(SimulationError::invalid("total mass must be positive and finite"));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimulationError::invalid("time step must be positive and finite"));
        }
        if !self.gravitational_constant.is_finite() {
            return Err(SimulationError::invalid("gravitational constant must be finite"));
        }
        if !(self.softening.is_finite() && self.softening > 0.0) {
            return Err(SimulationError::invalid("softening length must be positive and finite"));
        }
        Ok(())
    }

    /// Number of steps needed to reach `t_end`, truncating like `int(t_end / dt)`
    pub fn steps_until(&self, t_end: f64) -> usize {
        if t_end <= 0.0 {
            return 0;
        }
        (t_end / self.dt) as usize
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
