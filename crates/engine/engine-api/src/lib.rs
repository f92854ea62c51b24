//! Engine API
//!
//! Configuration types for windowing, calibration, scoring and training.
//! Every type has a `Default` matching the production policy and a
//! `validate()` that rejects values the engine cannot honour.

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use engine_spi::{
    DetectionResult, EngineError, HistorySource, NormalizationParameters, Result,
    SequenceRegressor, TrainingSet,
};

/// Window size used when none is configured.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Residual percentile used to calibrate the decision threshold.
pub const DEFAULT_PERCENTILE: f64 = 99.0;

/// Divisor applied to the calibrated threshold at decision time.
pub const DEFAULT_TIGHTENING: f64 = 4.0;

// ============================================================================
// Window Configuration
// ============================================================================

/// Sliding window configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Number of consecutive values fed to the regressor (default: 10).
    pub window_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl WindowConfig {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(EngineError::invalid_parameter(
                "window_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Calibration Configuration
// ============================================================================

/// Threshold calibration configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Residual percentile in `[0, 100]` (default: 99.0).
    pub percentile: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
        }
    }
}

impl CalibrationConfig {
    pub fn new(percentile: f64) -> Self {
        Self { percentile }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(EngineError::invalid_parameter(
                "percentile",
                format!("must be in [0, 100], got {}", self.percentile),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Scoring Configuration
// ============================================================================

/// Online decision rule configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// The calibrated threshold is divided by this factor before comparison
    /// (default: 4.0).
    pub tightening: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tightening: DEFAULT_TIGHTENING,
        }
    }
}

impl ScoringConfig {
    pub fn new(tightening: f64) -> Self {
        Self { tightening }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tightening.is_finite() || self.tightening <= 0.0 {
            return Err(EngineError::invalid_parameter(
                "tightening",
                format!("must be finite and positive, got {}", self.tightening),
            ));
        }
        Ok(())
    }

    /// Threshold compared against residuals for a calibrated `threshold`.
    pub fn effective_threshold(&self, threshold: f64) -> f64 {
        threshold / self.tightening
    }
}

// ============================================================================
// Regressor Configuration
// ============================================================================

/// Distance metric for comparing windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Standard Euclidean distance
    #[default]
    Euclidean,
    /// Manhattan (L1) distance
    Manhattan,
}

/// Which sequence regressor the training pipeline builds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegressorConfig {
    /// Ridge-regularized linear autoregression over the window.
    Linear {
        /// L2 penalty on the coefficients (not the intercept).
        ridge: f64,
    },
    /// Inverse-distance weighted K nearest training windows.
    Knn { k: usize, metric: DistanceMetric },
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self::Linear { ridge: 1e-6 }
    }
}

impl RegressorConfig {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Linear { ridge } if !ridge.is_finite() || ridge < 0.0 => Err(
                EngineError::invalid_parameter("ridge", "must be finite and non-negative"),
            ),
            Self::Knn { k: 0, .. } => Err(EngineError::invalid_parameter(
                "k",
                "must be at least 1",
            )),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Training Configuration
// ============================================================================

/// Everything the training pipeline needs besides the data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub regressor: RegressorConfig,
}

impl TrainingConfig {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window = WindowConfig::new(window_size);
        self
    }

    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.calibration = CalibrationConfig::new(percentile);
        self
    }

    pub fn with_regressor(mut self, regressor: RegressorConfig) -> Self {
        self.regressor = regressor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        self.calibration.validate()?;
        self.regressor.validate()
    }
}
