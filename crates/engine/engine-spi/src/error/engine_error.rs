//! Engine error types.

use thiserror::Error;

/// Errors raised by windowing, normalization, calibration, scoring and training.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Not enough prior samples to build the window preceding a new value.
    #[error("Insufficient history: need {required} prior samples, got {got}")]
    InsufficientHistory { required: usize, got: usize },

    #[error("Normalizer must be fitted before transformation")]
    NotFitted,

    #[error("Normalizer is already fitted; parameters are frozen")]
    AlreadyFitted,

    #[error("Degenerate value range: min {min} equals max {max}")]
    DegenerateRange { min: f64, max: f64 },

    #[error("Regressor error: {0}")]
    Regressor(String),

    #[error("Artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
