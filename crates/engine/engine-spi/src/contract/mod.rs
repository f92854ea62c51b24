//! Contract definitions for the engine.
//!
//! This module contains trait definitions that providers must implement.

mod history_source;
mod sequence_regressor;

pub use history_source::HistorySource;
pub use sequence_regressor::SequenceRegressor;
