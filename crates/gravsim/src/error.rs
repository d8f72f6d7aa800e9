//! Error types for simulation construction and stepping.

use thiserror::Error;

/// Which per-particle quantity went non-finite during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Position,
    Velocity,
    Acceleration,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quantity::Position => "position",
            Quantity::Velocity => "velocity",
            Quantity::Acceleration => "acceleration",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the simulation core
///
/// All errors are returned synchronously to the caller of the constructor
/// or of `step`; the core never retries or corrects silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Rejected at construction; fix the configuration before retrying
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A state value became NaN or infinite after a step
    #[error("numerical instability at t = {time}: {quantity} of particle {particle} is not finite")]
    NumericalInstability {
        time: f64,
        particle: usize,
        quantity: Quantity,
    },

    /// The run was halted by an earlier instability
    #[error("simulation halted after a numerical instability")]
    Halted,
}

impl SimulationError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SimulationError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
