//! Min-max normalization parameters.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Frozen min-max parameters fitted on the training series.
///
/// Invariant: both bounds are finite and `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParameters {
    min: f64,
    max: f64,
}

impl NormalizationParameters {
    /// Build parameters from explicit bounds.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(EngineError::InvalidData(format!(
                "normalization bounds must be finite, got [{min}, {max}]"
            )));
        }
        if max <= min {
            return Err(EngineError::DegenerateRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Fit the bounds to the full value range of `values`.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(EngineError::InsufficientData {
                required: 2,
                actual: 0,
            });
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self::new(min, max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// `(v - min) / (max - min)`; values outside the range extrapolate.
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    /// `v * (max - min) + min`.
    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }

    /// Check the invariant after deserialization.
    pub fn validate(&self) -> Result<()> {
        Self::new(self.min, self.max).map(|_| ())
    }
}
