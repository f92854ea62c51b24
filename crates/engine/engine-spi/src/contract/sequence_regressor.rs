//! Sequence regressor trait definition.

use crate::error::Result;
use crate::model::TrainingSet;

/// One-step-ahead regressor over fixed-size windows.
///
/// Implementations see normalized windows only and answer in the same
/// normalized space; mapping back to raw units is the caller's job.
pub trait SequenceRegressor: Send + Sync {
    /// Short identifier of the model family, e.g. `"linear"`.
    fn name(&self) -> &str;

    /// Train on normalized windows and their normalized targets.
    fn fit(&mut self, training: &TrainingSet) -> Result<()>;

    /// Predict the value that follows `window`.
    fn predict(&self, window: &[f64]) -> Result<f64>;

    /// Predict the value following each window, in order.
    fn predict_batch(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        windows.iter().map(|w| self.predict(w)).collect()
    }

    /// Window length the model was trained on, if fitted.
    fn input_size(&self) -> Option<usize>;

    /// Check if the regressor has been fitted.
    fn is_fitted(&self) -> bool {
        self.input_size().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    /// Predicts the last element of the window.
    struct Persistence {
        size: Option<usize>,
    }

    impl SequenceRegressor for Persistence {
        fn name(&self) -> &str {
            "persistence"
        }

        fn fit(&mut self, training: &TrainingSet) -> Result<()> {
            self.size = Some(training.window_size());
            Ok(())
        }

        fn predict(&self, window: &[f64]) -> Result<f64> {
            self.size.ok_or(EngineError::NotFitted)?;
            window.last().copied().ok_or(EngineError::InsufficientData {
                required: 1,
                actual: 0,
            })
        }

        fn input_size(&self) -> Option<usize> {
            self.size
        }
    }

    #[test]
    fn test_default_batch_preserves_order() {
        let mut model = Persistence { size: None };
        assert!(!model.is_fitted());

        let training = TrainingSet::new(vec![vec![0.1, 0.2]], vec![0.3]).unwrap();
        model.fit(&training).unwrap();
        assert!(model.is_fitted());

        let out = model
            .predict_batch(&[vec![0.0, 0.4], vec![0.0, 0.9], vec![0.0, 0.2]])
            .unwrap();
        assert_eq!(out, vec![0.4, 0.9, 0.2]);
    }

    #[test]
    fn test_unfitted_predict_fails() {
        let model = Persistence { size: None };
        assert!(matches!(model.predict(&[1.0]), Err(EngineError::NotFitted)));
    }
}
