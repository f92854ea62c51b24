//! Historical data source trait definition.

use crate::error::Result;

/// Source of the historical series consumed by the training pipeline.
///
/// Values are returned in chronological order, oldest first.
pub trait HistorySource: Send + Sync {
    /// Human readable name used in logs.
    fn name(&self) -> &str;

    /// Load the complete historical series.
    fn load(&self) -> Result<Vec<f64>>;
}

impl HistorySource for Vec<f64> {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn load(&self) -> Result<Vec<f64>> {
        Ok(self.clone())
    }
}
