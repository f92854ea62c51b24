//! Materialized training windows.

use crate::error::{EngineError, Result};

/// Windows paired with their targets, as handed to a regressor.
///
/// Invariant: one target per window, every window has the same non-zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    windows: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl TrainingSet {
    pub fn new(windows: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self> {
        if windows.len() != targets.len() {
            return Err(EngineError::invalid_parameter(
                "targets",
                format!(
                    "expected {} targets for {} windows, got {}",
                    windows.len(),
                    windows.len(),
                    targets.len()
                ),
            ));
        }
        if let Some(first) = windows.first() {
            let size = first.len();
            if size == 0 {
                return Err(EngineError::invalid_parameter(
                    "window_size",
                    "must be at least 1",
                ));
            }
            if let Some(bad) = windows.iter().position(|w| w.len() != size) {
                return Err(EngineError::InvalidData(format!(
                    "window {bad} has length {}, expected {size}",
                    windows[bad].len()
                )));
            }
        }
        Ok(Self { windows, targets })
    }

    pub fn windows(&self) -> &[Vec<f64>] {
        &self.windows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Length of every window, or 0 for an empty set.
    pub fn window_size(&self) -> usize {
        self.windows.first().map_or(0, Vec::len)
    }
}
