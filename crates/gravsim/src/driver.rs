//! Simulation driver.
//!
//! Owns one particle system and its energy history, and advances them
//! together one fixed step at a time:
//! 1. Integrator step (kick, drift, force refresh, kick, clock)
//! 2. Energy diagnostics on the new state
//! 3. Append `(t, K, P, T)` to the history

use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::config::{IntegratorKind, SimulationConfig};
use crate::energy::{Energy, EnergyHistory, EnergyRecord, compute_energy};
use crate::error::{Result, SimulationError};
use crate::forces::{ForceKernel, Gravity};
use crate::integrator::{Euler, Integrator, Leapfrog, refresh_accelerations};
use crate::state::{ParticleSystemState, Vector};

/// Owned copy of the observable state at one instant
///
/// Taken after a step has fully completed; later steps never change it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<const D: usize> {
    /// Index of the step that produced this snapshot (1 for the first step)
    pub step: usize,
    pub time: f64,
    pub positions: Vec<Vector<D>>,
    pub velocities: Vec<Vector<D>>,
    pub energy: Energy,
}

impl<const D: usize> Snapshot<D> {
    fn capture(step: usize, state: &ParticleSystemState<D>, energy: Energy) -> Self {
        Self {
            step,
            time: state.time(),
            positions: state.positions().to_vec(),
            velocities: state.velocities().to_vec(),
            energy,
        }
    }

    /// Positions as plain arrays
    pub fn position_arrays(&self) -> Vec<[f64; D]> {
        self.positions.iter().map(|x| (*x).into()).collect()
    }

    /// Velocities as plain arrays
    pub fn velocity_arrays(&self) -> Vec<[f64; D]> {
        self.velocities.iter().map(|v| (*v).into()).collect()
    }
}

/// A running N-body simulation in `D` dimensions
///
/// The time step, gravitational constant, softening and force law are
/// captured at construction and cannot change for the rest of the run.
///
/// # Examples
///
/// ```
/// use gravsim::config::SimulationConfig;
/// use gravsim::driver::Simulation;
///
/// let config = SimulationConfig::new().with_particle_count(10).with_dimension(2);
/// let mut sim = Simulation::<2>::new(&config).unwrap();
///
/// for snapshot in sim.run(100) {
///     let snapshot = snapshot.unwrap();
///     assert_eq!(snapshot.positions.len(), 10);
/// }
///
/// // Initial record plus one per step
/// assert_eq!(sim.history().len(), 101);
/// ```
pub struct Simulation<const D: usize> {
    state: ParticleSystemState<D>,
    history: EnergyHistory,
    force: Box<dyn ForceKernel<D>>,
    integrator: Box<dyn Integrator<D>>,
    dt: f64,
    steps_taken: usize,
    halted: bool,
}

impl<const D: usize> Simulation<D> {
    /// Creates a randomly initialized simulation
    ///
    /// The initial conditions come from a `ChaChaRng` seeded with
    /// `config.seed` and owned by this call, so equal configs give equal
    /// runs regardless of what else runs in the process.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        check_config::<D>(config)?;
        let mut rng = ChaChaRng::seed_from_u64(config.seed);
        let state = ParticleSystemState::initialize(config.particle_count, config.total_mass, &mut rng)?;
        Self::from_state(config, state)
    }

    /// Creates a simulation from explicit initial conditions
    ///
    /// `particle_count`, `total_mass` and `seed` in `config` are ignored;
    /// the state defines them.
    pub fn from_state(config: &SimulationConfig, mut state: ParticleSystemState<D>) -> Result<Self> {
        check_config::<D>(config)?;

        let gravity = Gravity::new(
            config.gravitational_constant,
            config.softening,
            config.softening_law,
        );
        let force = config.backend.build::<D>(gravity);
        let integrator: Box<dyn Integrator<D>> = match config.integrator {
            IntegratorKind::Leapfrog => Box::new(Leapfrog),
            IntegratorKind::Euler => Box::new(Euler),
        };

        // the first half-kick needs a(t = 0)
        refresh_accelerations(&mut state, force.as_ref());
        if let Some((particle, quantity)) = state.first_non_finite() {
            return Err(SimulationError::NumericalInstability {
                time: state.time(),
                particle,
                quantity,
            });
        }

        let mut history = EnergyHistory::new();
        history.push(EnergyRecord::new(state.time(), compute_energy(&state, &gravity)));

        Ok(Self {
            state,
            history,
            force,
            integrator,
            dt: config.dt,
            steps_taken: 0,
            halted: false,
        })
    }

    /// Advance by one step and record its energy
    ///
    /// The step runs on a copy of the state that replaces it only once the
    /// step has passed its finiteness check. After a `NumericalInstability`
    /// the simulation is halted: every later call returns `Halted`, and the
    /// state and history stay at the last completed step.
    pub fn step(&mut self) -> Result<EnergyRecord> {
        if self.halted {
            return Err(SimulationError::Halted);
        }
        let mut next = self.state.clone();
        if let Err(e) = self.integrator.step(&mut next, self.dt, self.force.as_ref()) {
            self.halted = true;
            return Err(e);
        }
        self.state = next;
        self.steps_taken += 1;

        let record = EnergyRecord::new(self.state.time(), self.energy());
        self.history.push(record);
        Ok(record)
    }

    /// Lazily run up to `num_steps` steps, yielding a snapshot after each
    ///
    /// The iterator is finite and consumes steps as it goes: dropping it
    /// early leaves the simulation after the last yielded step. It ends
    /// after the first error.
    pub fn run(&mut self, num_steps: usize) -> Run<'_, D> {
        Run {
            sim: self,
            remaining: num_steps,
            failed: false,
        }
    }

    /// Energy of the current state
    pub fn energy(&self) -> Energy {
        compute_energy(&self.state, self.force.gravity())
    }

    pub fn state(&self) -> &ParticleSystemState<D> {
        &self.state
    }

    pub fn history(&self) -> &EnergyHistory {
        &self.history
    }

    pub fn time(&self) -> f64 {
        self.state.time()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn gravity(&self) -> &Gravity {
        self.force.gravity()
    }

    /// Number of completed steps
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Snapshot<D> {
        Snapshot::capture(self.steps_taken, &self.state, self.energy())
    }
}

fn check_config<const D: usize>(config: &SimulationConfig) -> Result<()> {
    config.validate()?;
    if config.dimension != D {
        return Err(SimulationError::invalid(format!(
            "configured dimension {} does not match a {}-dimensional simulation",
            config.dimension, D
        )));
    }
    Ok(())
}

/// Iterator returned by [`Simulation::run`]
pub struct Run<'a, const D: usize> {
    sim: &'a mut Simulation<D>,
    remaining: usize,
    failed: bool,
}

impl<const D: usize> Iterator for Run<'_, D> {
    type Item = Result<Snapshot<D>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.failed {
            return None;
        }
        self.remaining -= 1;

        match self.sim.step() {
            Ok(record) => Some(Ok(Snapshot::capture(
                self.sim.steps_taken,
                &self.sim.state,
                record.energy(),
            ))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.remaining))
        }
    }
}

impl<const D: usize> std::iter::FusedIterator for Run<'_, D> {}
