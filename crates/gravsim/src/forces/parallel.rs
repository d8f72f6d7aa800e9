//! Direct summation split across the rayon thread pool

use rayon::prelude::*;

use crate::forces::gravity::acceleration_on;
use crate::forces::{ForceKernel, Gravity};
use crate::state::Vector;

/// Data-parallel version of [`DirectSummation`](crate::forces::DirectSummation)
///
/// Work is split over the outer particle index; each output slot is written
/// by exactly one worker and the inner sum runs in the same order as the
/// direct kernel, so results are bit-identical to it.
#[derive(Debug, Clone, Copy)]
pub struct ParallelSummation {
    gravity: Gravity,
}

impl ParallelSummation {
    pub fn new(gravity: Gravity) -> Self {
        Self { gravity }
    }
}

impl<const D: usize> ForceKernel<D> for ParallelSummation {
    fn compute_accelerations(&self, positions: &[Vector<D>], masses: &[f64], out: &mut [Vector<D>]) {
        out.par_iter_mut().enumerate().for_each(|(i, a)| {
            *a = acceleration_on(&self.gravity, i, positions, masses);
        });
    }

    fn gravity(&self) -> &Gravity {
        &self.gravity
    }
}
