//! Softened N-body gravity with a symplectic leapfrog integrator.
//!
//! `gravsim` evolves a closed system of point masses under pairwise
//! softened Newtonian gravity and tracks kinetic, potential and total
//! energy as it goes. It is a simulation core: drawing, progress reporting
//! and user interaction belong to the caller.
//!
//! # Example
//!
//! ```
//! use gravsim::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::new().with_particle_count(20).with_seed(42);
//! let mut sim = Simulation::<3>::new(&config).unwrap();
//!
//! let last = sim.run(10).last().unwrap().unwrap();
//! assert!((last.time - 0.1).abs() < 1e-12);
//! ```

pub mod config;
pub mod driver;
pub mod energy;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod state;
pub mod trail;

#[cfg(test)]
mod integrator_test;
#[cfg(test)]
mod state_test;

pub use config::{ForceBackend, IntegratorKind, SimulationConfig};
pub use driver::{Run, Simulation, Snapshot};
pub use energy::{Energy, EnergyHistory, EnergyRecord, compute_energy};
pub use error::{Quantity, SimulationError};
pub use forces::{DirectSummation, ForceKernel, Gravity, ParallelSummation, SofteningLaw, SymmetricSummation};
pub use integrator::{Euler, Integrator, Leapfrog};
pub use state::{ParticleSystemState, Vector};
pub use trail::PositionTrail;
