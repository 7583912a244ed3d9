//! Error types for the scheduling core

use thiserror::Error;

/// Core error type for scheduling and prediction operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedError {
    /// Rejected input: empty process set, zero burst time, zero quantum,
    /// prediction count mismatch and similar
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The simulation reached a state it can never leave
    #[error("Degenerate state: {0}")]
    DegenerateState(String),

    /// Ensemble training failed
    #[error("Training error: {0}")]
    Training(String),
}

impl SchedError {
    /// Whether the error was caused by the caller's input
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias for scheduling operations
pub type Result<T> = std::result::Result<T, SchedError>;
