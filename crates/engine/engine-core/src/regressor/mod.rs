//! Sequence regressor implementations.
//!
//! - [`LinearAutoregressor`]: ridge least squares over the window (default)
//! - [`KnnRegressor`]: inverse-distance weighted nearest training windows

mod knn;
mod linear;

pub use knn::KnnRegressor;
pub use linear::LinearAutoregressor;

use engine_api::{RegressorConfig, Result, SequenceRegressor, TrainingSet};
use serde::{Deserialize, Serialize};

/// Serializable regressor stored inside the artifact bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegressorModel {
    Linear(LinearAutoregressor),
    Knn(KnnRegressor),
}

impl RegressorModel {
    /// An unfitted regressor for the configured model family.
    pub fn from_config(config: &RegressorConfig) -> Result<Self> {
        config.validate()?;
        Ok(match *config {
            RegressorConfig::Linear { ridge } => Self::Linear(LinearAutoregressor::new(ridge)?),
            RegressorConfig::Knn { k, metric } => Self::Knn(KnnRegressor::new(k, metric)?),
        })
    }

    fn inner(&self) -> &dyn SequenceRegressor {
        match self {
            Self::Linear(model) => model,
            Self::Knn(model) => model,
        }
    }
}

impl SequenceRegressor for RegressorModel {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn fit(&mut self, training: &TrainingSet) -> Result<()> {
        match self {
            Self::Linear(model) => model.fit(training),
            Self::Knn(model) => model.fit(training),
        }
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        self.inner().predict(window)
    }

    fn input_size(&self) -> Option<usize> {
        self.inner().input_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_api::DistanceMetric;

    #[test]
    fn test_from_config() {
        let linear = RegressorModel::from_config(&RegressorConfig::default()).unwrap();
        assert_eq!(linear.name(), "linear");
        assert!(!linear.is_fitted());

        let knn = RegressorModel::from_config(&RegressorConfig::Knn {
            k: 3,
            metric: DistanceMetric::Euclidean,
        })
        .unwrap();
        assert_eq!(knn.name(), "knn");
    }

    #[test]
    fn test_serde_round_trip_keeps_predictions() {
        let windows: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64 / 30.0, (i + 1) as f64 / 30.0])
            .collect();
        let targets: Vec<f64> = (0..20).map(|i| (i + 2) as f64 / 30.0).collect();
        let training = TrainingSet::new(windows, targets).unwrap();

        let mut model = RegressorModel::from_config(&RegressorConfig::default()).unwrap();
        model.fit(&training).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains(r#""kind":"linear""#));
        let restored: RegressorModel = serde_json::from_str(&json).unwrap();

        let window = [0.4, 0.5];
        assert_eq!(
            model.predict(&window).unwrap(),
            restored.predict(&window).unwrap()
        );
    }
}
