//! Error types shared by the scheduler and the history store.

use thiserror::Error;

/// Errors returned synchronously by mutating operations.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-fatal adjustment of a request. Recorded as a diagnostic, never
    /// returned from an operation that went through.
    #[error("Input clamped: requested {requested}, applied {applied}")]
    ClampedInput { requested: i64, applied: i64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidArgument(_) => "invalid_argument",
            RelayError::NotFound(_) => "not_found",
            RelayError::ClampedInput { .. } => "clamped_input",
            RelayError::Config(_) => "config",
            RelayError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
