//! Error types shared by the board, the rules and the engine.

use thiserror::Error;

/// Errors reported by the simulation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifeError {
    #[error("Invalid board dimensions: {rows}x{cols} (must be positive, cell count within usize)")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("Board is {rows}x{cols}, engine expects {expected_rows}x{expected_cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} board")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Alive probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Step interval must be greater than zero")]
    InvalidInterval,

    #[error("No tokio runtime available to run the simulation engine")]
    NoRuntime,

    #[error("Simulation engine is no longer running")]
    EngineStopped,
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, LifeError>;
