//! Force kernels for N-body simulations
//!
//! This module provides the `ForceKernel` trait, the softened gravity law
//! shared by every kernel and by the energy diagnostics, and the concrete
//! kernel implementations.

use serde::{Deserialize, Serialize};

use crate::config::ForceBackend;
use crate::state::Vector;

pub mod gravity;
pub mod parallel;
pub mod symmetric;


pub use gravity::DirectSummation;
pub use parallel::ParallelSummation;
pub use symmetric::SymmetricSummation;

/// Softening convention used for both the pair force and the pair potential
///
/// The two variants are different force laws, not two spellings of the
/// same one. A run always takes its force and its potential from the same
/// variant so that the force is the gradient of the potential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SofteningLaw {
    /// Potential `-1/√(r² + ε²)`, force factor `(r² + ε²)^(-3/2)`
    #[default]
    Plummer,
    /// Potential `-1/(r + ε)`, force factor `1/(r (r + ε)²)`
    Linear,
}

/// Softened Newtonian gravity: gravitational constant, softening length and law
///
/// # Examples
///
/// ```
/// use gravsim::forces::{Gravity, SofteningLaw};
///
/// let gravity = Gravity::new(1.0, 0.1, SofteningLaw::Plummer);
///
/// // Coincident particles stay finite
/// assert!(gravity.inverse_cube(0.0).is_finite());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub g: f64,
    pub softening: f64,
    pub law: SofteningLaw,
}

impl Gravity {
    pub fn new(g: f64, softening: f64, law: SofteningLaw) -> Self {
        Self { g, softening, law }
    }

    /// Plummer-softened gravity
    pub fn plummer(g: f64, softening: f64) -> Self {
        Self::new(g, softening, SofteningLaw::Plummer)
    }

    /// Radial factor `f` such that the pull of a unit mass at offset `r` is `G r f`
    ///
    /// `r2` is the squared separation.
    #[inline]
    pub fn inverse_cube(&self, r2: f64) -> f64 {
        match self.law {
            SofteningLaw::Plummer => {
                let inv_r = (r2 + self.softening * self.softening).sqrt().recip();
                inv_r * inv_r * inv_r
            }
            SofteningLaw::Linear => {
                let r = r2.sqrt();
                if r == 0.0 {
                    // r is the zero vector, so the pull is zero whatever the factor
                    return 0.0;
                }
                let s = r + self.softening;
                (r * s * s).recip()
            }
        }
    }

    /// Softened `1/r` used by the pair potential `-G m_i m_j φ(r)`
    #[inline]
    pub fn inverse_distance(&self, r2: f64) -> f64 {
        match self.law {
            SofteningLaw::Plummer => (r2 + self.softening * self.softening).sqrt().recip(),
            SofteningLaw::Linear => (r2.sqrt() + self.softening).recip(),
        }
    }

    /// Acceleration on a particle at `xi` due to a particle of mass `mj` at `xj`
    #[inline]
    pub fn pair_acceleration<const D: usize>(&self, xi: &Vector<D>, xj: &Vector<D>, mj: f64) -> Vector<D> {
        let r = xj - xi;
        r * (self.g * mj * self.inverse_cube(r.norm_squared()))
    }

    /// Potential energy of one pair
    #[inline]
    pub fn pair_potential<const D: usize>(&self, xi: &Vector<D>, xj: &Vector<D>, mi: f64, mj: f64) -> f64 {
        -self.g * mi * mj * self.inverse_distance((xj - xi).norm_squared())
    }

    /// Upper bound on the acceleration a mass `m` can cause at any separation
    ///
    /// Both laws stay below `G m / ε²`.
    pub fn max_acceleration(&self, m: f64) -> f64 {
        self.g.abs() * m / (self.softening * self.softening)
    }
}

/// Computes accelerations for every particle from positions and masses
///
/// A kernel is a pure function of its inputs: it keeps no state between
/// calls. `out` is overwritten, not accumulated into.
///
/// # Examples
///
/// ```
/// use gravsim::forces::{DirectSummation, ForceKernel, Gravity};
/// use nalgebra::Vector2;
///
/// let kernel = DirectSummation::new(Gravity::plummer(1.0, 0.1));
/// let positions = [Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)];
/// let masses = [1.0, 1.0];
///
/// let accel = kernel.accelerations(&positions, &masses);
/// assert!(accel[0].x > 0.0);
/// assert!(accel[1].x < 0.0);
/// ```
pub trait ForceKernel<const D: usize>: Send + Sync {
    /// Write the acceleration of particle `i` into `out[i]`
    ///
    /// `positions`, `masses` and `out` must have the same length.
    fn compute_accelerations(&self, positions: &[Vector<D>], masses: &[f64], out: &mut [Vector<D>]);

    /// The force law this kernel evaluates
    fn gravity(&self) -> &Gravity;

    /// Allocating convenience wrapper around `compute_accelerations`
    fn accelerations(&self, positions: &[Vector<D>], masses: &[f64]) -> Vec<Vector<D>> {
        let mut out = vec![Vector::zeros(); positions.len()];
        self.compute_accelerations(positions, masses, &mut out);
        out
    }
}

impl ForceBackend {
    /// Build the kernel this backend names
    pub fn build<const D: usize>(self, gravity: Gravity) -> Box<dyn ForceKernel<D>> {
        match self {
            ForceBackend::Direct => Box::new(DirectSummation::new(gravity)),
            ForceBackend::Parallel => Box::new(ParallelSummation::new(gravity)),
            ForceBackend::Symmetric => Box::new(SymmetricSummation::new(gravity)),
        }
    }
}
