//! Threshold calibration from training residuals.

use engine_api::{CalibrationConfig, EngineError, Result};

/// Absolute forecast errors, in the units of the inputs.
pub fn residuals(forecasts: &[f64], targets: &[f64]) -> Result<Vec<f64>> {
    if forecasts.len() != targets.len() {
        return Err(EngineError::invalid_parameter(
            "forecasts",
            format!(
                "got {} forecasts for {} targets",
                forecasts.len(),
                targets.len()
            ),
        ));
    }
    Ok(forecasts
        .iter()
        .zip(targets.iter())
        .map(|(f, t)| (f - t).abs())
        .collect())
}

/// Percentile of a sorted slice with linear interpolation.
///
/// Position is `p / 100 * (M - 1)`; fractional positions interpolate between
/// the two bracketing values.
pub fn percentile(sorted: &[f64], p: f64) -> Result<f64> {
    CalibrationConfig::new(p).validate()?;
    let last = match sorted.len() {
        0 => {
            return Err(EngineError::InsufficientData {
                required: 1,
                actual: 0,
            })
        }
        n => n - 1,
    };

    let position = p / 100.0 * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Outcome of a calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub threshold: f64,
    pub percentile: f64,
    /// Residuals in window order.
    pub residuals: Vec<f64>,
    pub mean_residual: f64,
    pub max_residual: f64,
}

impl Calibration {
    /// Per-window flags for residuals above the calibrated threshold.
    pub fn exceedances(&self) -> Vec<bool> {
        self.residuals.iter().map(|&r| r > self.threshold).collect()
    }

    pub fn exceedance_count(&self) -> usize {
        self.residuals.iter().filter(|&&r| r > self.threshold).count()
    }
}

/// Computes the decision threshold as a tail percentile of residuals.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdCalibrator {
    config: CalibrationConfig,
}

impl Default for ThresholdCalibrator {
    fn default() -> Self {
        Self {
            config: CalibrationConfig::default(),
        }
    }
}

impl ThresholdCalibrator {
    pub fn new(config: CalibrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn percentile(&self) -> f64 {
        self.config.percentile
    }

    /// Threshold for already computed residuals.
    pub fn threshold(&self, residuals: &[f64]) -> Result<f64> {
        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(EngineError::InvalidData(
                "residuals must be finite".to_string(),
            ));
        }
        let mut sorted = residuals.to_vec();
        sorted.sort_by(f64::total_cmp);
        percentile(&sorted, self.config.percentile)
    }

    /// Calibrate from raw-unit forecasts and their true targets.
    pub fn calibrate(&self, forecasts: &[f64], targets: &[f64]) -> Result<Calibration> {
        let residuals = residuals(forecasts, targets)?;
        let threshold = self.threshold(&residuals)?;
        let mean_residual = residuals.iter().sum::<f64>() / residuals.len() as f64;
        let max_residual = residuals.iter().cloned().fold(0.0, f64::max);

        Ok(Calibration {
            threshold,
            percentile: self.config.percentile,
            residuals,
            mean_residual,
            max_residual,
        })
    }
}
