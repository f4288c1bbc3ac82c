//! Error types for facility siting.

use thiserror::Error;

/// Errors that abort a solve.
///
/// A search that runs out of admissible moves is not an error; it ends with
/// [`StopReason::NoAdmissibleMove`](crate::tabu::StopReason::NoAdmissibleMove)
/// and still returns the incumbent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SitingError {
    /// Invalid solver or generator parameters.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A map does not match the demand grid, or is ragged.
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    Shape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The greedy constructor ran out of candidate cells.
    #[error("Cannot construct starting solution: placed {placed} of {requested} facilities")]
    InfeasibleStart { placed: usize, requested: usize },
}

/// Result type alias for siting operations.
pub type Result<T> = std::result::Result<T, SitingError>;
