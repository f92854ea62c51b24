//! Offline training pipeline.
//!
//! `LoadData -> FitNormalizer -> BuildWindows -> TrainRegressor ->
//! ComputeResiduals -> CalibrateThreshold -> PersistBundle`
//!
//! Stages run once, in order. The first failing stage aborts the run and
//! nothing is written.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use engine_api::{EngineError, HistorySource, Result, SequenceRegressor, TrainingConfig};
use rayon::prelude::*;

use crate::artifact::{ArtifactBundle, TrainingSummary};
use crate::calibrator::{Calibration, ThresholdCalibrator};
use crate::normalizer::MinMaxNormalizer;
use crate::regressor::RegressorModel;
use crate::window::WindowBuilder;

/// Stages of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStage {
    LoadData,
    FitNormalizer,
    BuildWindows,
    TrainRegressor,
    ComputeResiduals,
    CalibrateThreshold,
    PersistBundle,
}

impl TrainingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadData => "load_data",
            Self::FitNormalizer => "fit_normalizer",
            Self::BuildWindows => "build_windows",
            Self::TrainRegressor => "train_regressor",
            Self::ComputeResiduals => "compute_residuals",
            Self::CalibrateThreshold => "calibrate_threshold",
            Self::PersistBundle => "persist_bundle",
        }
    }
}

impl fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn run_stage<T>(stage: TrainingStage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    tracing::debug!(%stage, "stage started");
    match f() {
        Ok(out) => {
            tracing::info!(
                %stage,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage complete"
            );
            Ok(out)
        }
        Err(e) => {
            tracing::error!(%stage, error = %e, "training aborted");
            Err(e)
        }
    }
}

/// Result of a successful training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    /// In-sample residuals and the calibrated threshold.
    pub calibration: Calibration,
}

/// Batch trainer producing an [`ArtifactBundle`].
#[derive(Debug, Clone, Default)]
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load, train and persist to `output`.
    pub fn run(&self, source: &dyn HistorySource, output: &Path) -> Result<TrainingOutcome> {
        tracing::info!(source = source.name(), output = %output.display(), "training run started");
        let values = run_stage(TrainingStage::LoadData, || source.load())?;
        let outcome = self.train(&values)?;
        run_stage(TrainingStage::PersistBundle, || outcome.bundle.save(output))?;
        Ok(outcome)
    }

    /// Every stage except loading and persistence, over an in-memory series.
    pub fn train(&self, values: &[f64]) -> Result<TrainingOutcome> {
        let builder = WindowBuilder::from_config(self.config.window)?;
        let window_size = builder.window_size();
        if values.len() <= window_size {
            return Err(EngineError::InsufficientData {
                required: window_size.saturating_add(1),
                actual: values.len(),
            });
        }

        let mut normalizer = MinMaxNormalizer::new();
        let params = run_stage(TrainingStage::FitNormalizer, || normalizer.fit(values))?;

        let training = run_stage(TrainingStage::BuildWindows, || {
            let scaled = normalizer.transform(values)?;
            let training = builder.training_set(&scaled)?;
            tracing::info!(windows = training.len(), window_size, "windows built");
            Ok(training)
        })?;

        let mut regressor = RegressorModel::from_config(&self.config.regressor)?;
        run_stage(TrainingStage::TrainRegressor, || regressor.fit(&training))?;

        let forecasts = run_stage(TrainingStage::ComputeResiduals, || {
            let normalized = training
                .windows()
                .par_iter()
                .map(|window| regressor.predict(window))
                .collect::<Result<Vec<f64>>>()?;
            Ok(normalized
                .into_iter()
                .map(|f| params.inverse_transform(f))
                .collect::<Vec<f64>>())
        })?;

        // raw targets, aligned with window order
        let targets = &values[window_size..];
        let calibration = run_stage(TrainingStage::CalibrateThreshold, || {
            let calibration =
                ThresholdCalibrator::new(self.config.calibration)?.calibrate(&forecasts, targets)?;
            tracing::info!(
                threshold = calibration.threshold,
                percentile = calibration.percentile,
                mean_residual = calibration.mean_residual,
                "threshold calibrated"
            );
            Ok(calibration)
        })?;

        let summary = TrainingSummary {
            series_len: values.len(),
            window_count: training.len(),
            mean_residual: calibration.mean_residual,
            max_residual: calibration.max_residual,
            in_sample_anomalies: calibration.exceedance_count(),
            trained_at: Utc::now(),
        };
        let bundle = ArtifactBundle::new(
            regressor,
            params,
            window_size,
            calibration.threshold,
            calibration.percentile,
            summary,
        )?;

        Ok(TrainingOutcome {
            bundle,
            calibration,
        })
    }
}
