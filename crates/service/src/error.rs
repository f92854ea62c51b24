use engine::EngineError;
use series::StoreError;
use thiserror::Error;

/// Errors surfaced by the online service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid value: {0:?} is not a finite number")]
    InvalidValue(String),

    #[error("Insufficient history: need {required} prior samples, have {got}")]
    InsufficientHistory { required: usize, got: usize },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl ServiceError {
    /// Lift an engine error, keeping insufficient history distinguishable.
    pub fn from_engine(err: EngineError) -> Self {
        match err {
            EngineError::InsufficientHistory { required, got } => {
                Self::InsufficientHistory { required, got }
            }
            other => Self::Engine(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Parse a raw measurement. Anything that is not a finite number is rejected.
pub fn parse_value(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ServiceError::InvalidValue(raw.to_string())),
    }
}
