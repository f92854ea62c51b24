//! Persisted artifact bundle.
//!
//! The bundle is the only state shared between offline training and online
//! scoring. It is written once, atomically, and loaded once as a whole.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use engine_api::{EngineError, NormalizationParameters, Result, SequenceRegressor};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::regressor::RegressorModel;

/// Current on-disk format version.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Facts about the training run, kept for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub series_len: usize,
    pub window_count: usize,
    pub mean_residual: f64,
    pub max_residual: f64,
    /// Training windows whose residual exceeds the calibrated threshold.
    pub in_sample_anomalies: usize,
    pub trained_at: DateTime<Utc>,
}

/// Frozen output of the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    format_version: u32,
    regressor: RegressorModel,
    normalization: NormalizationParameters,
    window_size: usize,
    threshold: f64,
    percentile: f64,
    summary: TrainingSummary,
}

impl ArtifactBundle {
    pub fn new(
        regressor: RegressorModel,
        normalization: NormalizationParameters,
        window_size: usize,
        threshold: f64,
        percentile: f64,
        summary: TrainingSummary,
    ) -> Result<Self> {
        let bundle = Self {
            format_version: BUNDLE_FORMAT_VERSION,
            regressor,
            normalization,
            window_size,
            threshold,
            percentile,
            summary,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn regressor(&self) -> &RegressorModel {
        &self.regressor
    }

    pub fn normalization(&self) -> NormalizationParameters {
        self.normalization
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Calibrated threshold, in raw units.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Raw-unit forecast for a raw window of exactly `window_size` values.
    pub fn forecast(&self, window: &[f64]) -> Result<f64> {
        if window.len() != self.window_size {
            return Err(EngineError::invalid_parameter(
                "window",
                format!("expected {} values, got {}", self.window_size, window.len()),
            ));
        }
        let normalized: Vec<f64> = window
            .iter()
            .map(|&v| self.normalization.transform(v))
            .collect();
        let predicted = self.regressor.predict(&normalized)?;
        Ok(self.normalization.inverse_transform(predicted))
    }

    fn validate(&self) -> Result<()> {
        let corrupt = |reason: String| Err(EngineError::ArtifactCorrupt(reason));

        if self.format_version != BUNDLE_FORMAT_VERSION {
            return corrupt(format!(
                "unsupported format version {}, expected {}",
                self.format_version, BUNDLE_FORMAT_VERSION
            ));
        }
        if self.window_size == 0 {
            return corrupt("window_size must be at least 1".to_string());
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return corrupt(format!(
                "threshold must be finite and non-negative, got {}",
                self.threshold
            ));
        }
        if let Err(e) = self.normalization.validate() {
            return corrupt(format!("normalization: {e}"));
        }
        match self.regressor.input_size() {
            Some(size) if size == self.window_size => Ok(()),
            Some(size) => corrupt(format!(
                "regressor expects windows of {size}, bundle window_size is {}",
                self.window_size
            )),
            None => corrupt("regressor is not fitted".to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::InvalidData(format!("bundle serialization: {e}")))
    }

    /// Parse and validate a bundle; any failure is `ArtifactCorrupt`.
    pub fn from_json(json: &str) -> Result<Self> {
        let bundle: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::ArtifactCorrupt(format!("parse error: {e}")))?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Write the bundle so readers only ever see a complete file.
    ///
    /// The JSON goes to a temporary file in the destination directory, is
    /// flushed to disk, then renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| EngineError::Io(e.error))?;

        tracing::info!(path = %path.display(), bytes = json.len(), "artifact bundle written");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            EngineError::ArtifactCorrupt(format!("cannot read {}: {e}", path.display()))
        })?;
        let bundle = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            window_size = bundle.window_size,
            threshold = bundle.threshold,
            regressor = bundle.regressor.name(),
            "artifact bundle loaded"
        );
        Ok(bundle)
    }
}
