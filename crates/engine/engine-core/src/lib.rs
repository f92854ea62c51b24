//! Engine Core
//!
//! Implementations of the windowed forecasting and anomaly-scoring engine.
//!
//! Training and inference share the same window and normalization code paths:
//! the [`TrainingPipeline`] produces an [`ArtifactBundle`], and the
//! [`AnomalyScorer`] consumes it without refitting anything.

mod artifact;
mod calibrator;
mod normalizer;
mod pipeline;
mod regressor;
mod scorer;
mod source;
mod window;

pub use artifact::{ArtifactBundle, TrainingSummary, BUNDLE_FORMAT_VERSION};
pub use calibrator::{percentile, residuals, Calibration, ThresholdCalibrator};
pub use normalizer::MinMaxNormalizer;
pub use pipeline::{TrainingOutcome, TrainingPipeline, TrainingStage};
pub use regressor::{KnnRegressor, LinearAutoregressor, RegressorModel};
pub use scorer::AnomalyScorer;
pub use source::CsvHistorySource;
pub use window::{WindowBuilder, WindowPair, Windows};
