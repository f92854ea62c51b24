//! Data models for the engine.

mod detection_result;
mod normalization;
mod training_set;

pub use detection_result::DetectionResult;
pub use normalization::NormalizationParameters;
pub use training_set::TrainingSet;
