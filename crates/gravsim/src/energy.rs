//! Energy diagnostics and the append-only energy history.

use serde::Serialize;

use crate::forces::Gravity;
use crate::state::ParticleSystemState;

/// Kinetic, potential and total energy of one state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Energy {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

impl Energy {
    pub fn new(kinetic: f64, potential: f64) -> Self {
        Self {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }
}

/// `K = ½ Σ m_i |v_i|²`
pub fn kinetic_energy<const D: usize>(state: &ParticleSystemState<D>) -> f64 {
    0.5 * state
        .velocities()
        .iter()
        .zip(state.masses())
        .map(|(v, m)| m * v.norm_squared())
        .sum::<f64>()
}

/// `P = Σ_{i<j} -G m_i m_j φ(|x_i - x_j|)`, φ taken from the gravity's softening law
pub fn potential_energy<const D: usize>(state: &ParticleSystemState<D>, gravity: &Gravity) -> f64 {
    let positions = state.positions();
    let masses = state.masses();

    positions
        .iter()
        .zip(masses)
        .enumerate()
        .flat_map(|(i, (xi, mi))| {
            positions[i + 1..]
                .iter()
                .zip(&masses[i + 1..])
                .map(move |(xj, mj)| gravity.pair_potential(xi, xj, *mi, *mj))
        })
        .sum()
}

/// Kinetic, potential and total energy of a state snapshot
///
/// # Examples
///
/// ```
/// use gravsim::energy::compute_energy;
/// use gravsim::forces::Gravity;
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
/// let energy = compute_energy(&state, &Gravity::plummer(1.0, 0.01));
/// assert_eq!(energy.kinetic, 0.0);
/// assert!(energy.potential < 0.0);
/// ```
pub fn compute_energy<const D: usize>(state: &ParticleSystemState<D>, gravity: &Gravity) -> Energy {
    Energy::new(kinetic_energy(state), potential_energy(state, gravity))
}

/// One `(t, K, P, T)` history entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyRecord {
    pub time: f64,
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

impl EnergyRecord {
    pub fn new(time: f64, energy: Energy) -> Self {
        Self {
            time,
            kinetic: energy.kinetic,
            potential: energy.potential,
            total: energy.total,
        }
    }

    pub fn energy(&self) -> Energy {
        Energy {
            kinetic: self.kinetic,
            potential: self.potential,
            total: self.total,
        }
    }
}

/// Append-only record of energies over a run
///
/// Records are never mutated or removed once pushed; only the owning
/// driver can append.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnergyHistory {
    records: Vec<EnergyRecord>,
}

impl EnergyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: EnergyRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EnergyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&EnergyRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&EnergyRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnergyRecord> {
        self.records.iter()
    }

    /// `max |T(t) - T(0)| / |T(0)|` over the whole history
    ///
    /// Zero for an empty history. If `T(0)` is zero the absolute drift is
    /// returned instead.
    pub fn max_relative_drift(&self) -> f64 {
        let Some(initial) = self.records.first() else {
            return 0.0;
        };
        let scale = if initial.total == 0.0 { 1.0 } else { initial.total.abs() };
        self.records
            .iter()
            .map(|r| (r.total - initial.total).abs() / scale)
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a EnergyHistory {
    type Item = &'a EnergyRecord;
    type IntoIter = std::slice::Iter<'a, EnergyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
