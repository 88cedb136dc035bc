//! Error taxonomy shared by the metric routines.

use tendiag_core::DecompositionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("mode index {mode} out of range for {n_modes}-mode decomposition")]
    InvalidModeIndex { mode: usize, n_modes: usize },

    #[error("rank {0} has no distinct component pairs")]
    NotEnoughComponents(usize),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("linear algebra error: {0}")]
    Linalg(String),

    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
}
