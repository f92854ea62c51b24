//! Per-call detection outcome.

use serde::{Deserialize, Serialize};

/// Result of scoring one incoming value against its preceding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Raw window values used as predictor input, oldest first.
    pub window: Vec<f64>,
    /// Incoming raw value that was scored.
    pub value: f64,
    /// One-step-ahead forecast in raw units.
    pub forecast: f64,
    /// `|value - forecast|`.
    pub residual: f64,
    /// Calibrated threshold as stored in the artifact bundle.
    pub threshold: f64,
    /// Threshold actually compared against the residual.
    pub effective_threshold: f64,
    pub is_anomaly: bool,
}
