//! Direct N-body gravity (O(N²) reference implementation)

use crate::forces::{ForceKernel, Gravity};
use crate::state::Vector;

/// Direct O(N²) gravitational acceleration
///
/// For each particle `i`, sums the pull of every other particle `j` in
/// ascending `j` order. Every other kernel is validated against this one.
///
/// # Examples
///
/// ```
/// use gravsim::forces::{DirectSummation, ForceKernel, Gravity};
/// use nalgebra::Vector3;
///
/// let kernel = DirectSummation::new(Gravity::plummer(1.0, 0.1));
/// let positions = [Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0)];
/// let accel = kernel.accelerations(&positions, &[1.0, 3.0]);
///
/// // The lighter particle is pulled harder
/// assert!(accel[0].norm() > accel[1].norm());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DirectSummation {
    gravity: Gravity,
}

impl DirectSummation {
    pub fn new(gravity: Gravity) -> Self {
        Self { gravity }
    }
}

impl<const D: usize> ForceKernel<D> for DirectSummation {
    fn compute_accelerations(&self, positions: &[Vector<D>], masses: &[f64], out: &mut [Vector<D>]) {
        for (i, a) in out.iter_mut().enumerate() {
            *a = acceleration_on(&self.gravity, i, positions, masses);
        }
    }

    fn gravity(&self) -> &Gravity {
        &self.gravity
    }
}

/// Acceleration of particle `idx` from all others, `j` ascending, self skipped
///
/// Shared by the direct and parallel kernels so both sum in the same order.
#[inline]
pub(crate) fn acceleration_on<const D: usize>(
    gravity: &Gravity,
    idx: usize,
    positions: &[Vector<D>],
    masses: &[f64],
) -> Vector<D> {
    let xi = &positions[idx];
    positions
        .iter()
        .zip(masses)
        .enumerate()
        .filter(|(j, _)| *j != idx)
        .fold(Vector::zeros(), |acc, (_, (xj, mj))| {
            acc + gravity.pair_acceleration(xi, xj, *mj)
        })
}
