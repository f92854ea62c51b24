//! Mirrors the most recent detection to a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use service::Detection;

/// File contents written after each successful detect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastResult {
    pub timestamp: i64,
    pub value: f64,
    pub window: Vec<WindowSample>,
    pub forecast: f64,
    pub threshold: f64,
    pub effective_threshold: f64,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSample {
    pub timestamp: i64,
    pub value: f64,
}

impl From<&Detection> for LastResult {
    fn from(detection: &Detection) -> Self {
        Self {
            timestamp: detection.timestamp,
            value: detection.result.value,
            window: detection
                .window
                .iter()
                .map(|s| WindowSample {
                    timestamp: s.timestamp,
                    value: s.value,
                })
                .collect(),
            forecast: detection.result.forecast,
            threshold: detection.result.threshold,
            effective_threshold: detection.result.effective_threshold,
            is_anomaly: detection.result.is_anomaly,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LastResultWriter {
    path: PathBuf,
}

impl LastResultWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `detection`. Failures are logged and otherwise ignored.
    pub async fn write(&self, detection: &Detection) {
        let json = match serde_json::to_vec_pretty(&LastResult::from(detection)) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode last detection");
                return;
            }
        };
        if let Err(err) = tokio::fs::write(&self.path, json).await {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to write last detection");
        }
    }
}
