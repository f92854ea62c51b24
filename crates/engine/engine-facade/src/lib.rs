//! Engine Facade
//!
//! Unified re-exports for the forecasting and anomaly-scoring engine.
//!
//! This facade provides a single entry point to:
//! - `SequenceRegressor`, `HistorySource` and `EngineError` from SPI
//! - Configuration types from API
//! - Window builder, normalizer, calibrator, scorer and training pipeline from Core

// Re-export everything from SPI
pub use engine_spi::*;

// Re-export everything from API
pub use engine_api::*;

// Re-export everything from Core
pub use engine_core::*;
