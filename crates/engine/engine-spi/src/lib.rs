//! Engine Service Provider Interface
//!
//! Contracts, data models and errors shared by the windowed forecasting and
//! anomaly-scoring engine.
//!
//! - [`SequenceRegressor`]: opaque model mapping a normalized window to the next value
//! - [`HistorySource`]: where the training pipeline loads historical values from
//! - [`EngineError`]: error type for every engine operation

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{HistorySource, SequenceRegressor};
pub use error::{EngineError, Result};
pub use model::{DetectionResult, NormalizationParameters, TrainingSet};
