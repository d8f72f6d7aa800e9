//! Pairwise gravity exploiting Newton's third law

use crate::forces::{ForceKernel, Gravity};
use crate::state::Vector;

/// Direct summation visiting each unordered pair once
///
/// For `i < j` the radial factor is computed a single time and applied with
/// opposite signs to both particles, halving the number of square roots.
/// The contributions reach each particle in a different order than in
/// [`DirectSummation`](crate::forces::DirectSummation), so results agree
/// only to rounding, not bit for bit.
#[derive(Debug, Clone, Copy)]
pub struct SymmetricSummation {
    gravity: Gravity,
}

impl SymmetricSummation {
    pub fn new(gravity: Gravity) -> Self {
        Self { gravity }
    }
}

impl<const D: usize> ForceKernel<D> for SymmetricSummation {
    fn compute_accelerations(&self, positions: &[Vector<D>], masses: &[f64], out: &mut [Vector<D>]) {
        out.iter_mut().for_each(|a| *a = Vector::zeros());

        let n = positions.len();
        for i in 0..n {
            let xi = positions[i];
            let mi = masses[i];
            for j in (i + 1)..n {
                // r points from i to j: i is pulled along +r, j along -r
                let r = positions[j] - xi;
                let coef = self.gravity.g * self.gravity.inverse_cube(r.norm_squared());
                out[i] += r * (coef * masses[j]);
                out[j] -= r * (coef * mi);
            }
        }
    }

    fn gravity(&self) -> &Gravity {
        &self.gravity
    }
}
