//! Online anomaly decision rule.

use std::sync::Arc;

use engine_api::{DetectionResult, EngineError, Result, ScoringConfig};

use crate::artifact::ArtifactBundle;
use crate::window::WindowBuilder;

/// Scores incoming values against a forecast from the frozen bundle.
///
/// Holds no mutable state; a single scorer can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    bundle: Arc<ArtifactBundle>,
    builder: WindowBuilder,
    config: ScoringConfig,
}

impl AnomalyScorer {
    pub fn new(bundle: Arc<ArtifactBundle>, config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        let builder = WindowBuilder::new(bundle.window_size())?;
        Ok(Self {
            bundle,
            builder,
            config,
        })
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn config(&self) -> ScoringConfig {
        self.config
    }

    pub fn window_size(&self) -> usize {
        self.builder.window_size()
    }

    /// Threshold the residual is compared against.
    pub fn effective_threshold(&self) -> f64 {
        self.config.effective_threshold(self.bundle.threshold())
    }

    /// Score `value` against the samples that preceded it.
    ///
    /// `history` is chronological and must not include `value`; only its last
    /// `window_size` entries are used.
    pub fn score(&self, value: f64, history: &[f64]) -> Result<DetectionResult> {
        if !value.is_finite() {
            return Err(EngineError::InvalidData(format!(
                "value must be finite, got {value}"
            )));
        }
        let window = self.builder.last_window(history)?;
        let forecast = self.bundle.forecast(window)?;
        let residual = (value - forecast).abs();
        let effective_threshold = self.effective_threshold();

        Ok(DetectionResult {
            window: window.to_vec(),
            value,
            forecast,
            residual,
            threshold: self.bundle.threshold(),
            effective_threshold,
            is_anomaly: residual > effective_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::TrainingSummary;
    use crate::regressor::RegressorModel;
    use engine_api::{NormalizationParameters, RegressorConfig, SequenceRegressor, TrainingSet};

    /// Bundle whose regressor repeats the last window value.
    fn persistence_bundle(threshold: f64) -> Arc<ArtifactBundle> {
        let windows: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                let i = i as f64;
                vec![(i * 0.37).fract(), (i * 0.71).fract(), (i * 0.53).fract()]
            })
            .collect();
        let targets = windows.iter().map(|w| w[2]).collect();
        let mut model = RegressorModel::from_config(&RegressorConfig::Linear { ridge: 0.0 }).unwrap();
        model.fit(&TrainingSet::new(windows, targets).unwrap()).unwrap();

        let summary = TrainingSummary {
            series_len: 15,
            window_count: 12,
            mean_residual: 0.0,
            max_residual: 0.0,
            in_sample_anomalies: 0,
            trained_at: chrono::Utc::now(),
        };
        Arc::new(
            ArtifactBundle::new(
                model,
                NormalizationParameters::new(0.0, 100.0).unwrap(),
                3,
                threshold,
                99.0,
                summary,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_flags_large_residual() {
        let scorer = AnomalyScorer::new(persistence_bundle(8.0), ScoringConfig::default()).unwrap();
        assert_eq!(scorer.effective_threshold(), 2.0);

        let result = scorer.score(50.0, &[10.0, 20.0, 30.0]).unwrap();
        assert!((result.forecast - 30.0).abs() < 1e-6);
        assert!((result.residual - 20.0).abs() < 1e-6);
        assert_eq!(result.threshold, 8.0);
        assert!(result.is_anomaly);

        let result = scorer.score(31.0, &[10.0, 20.0, 30.0]).unwrap();
        assert!(!result.is_anomaly);
    }

    #[test]
    fn test_uses_most_recent_window() {
        let scorer = AnomalyScorer::new(persistence_bundle(8.0), ScoringConfig::default()).unwrap();
        let result = scorer.score(70.0, &[1.0, 2.0, 40.0, 50.0, 70.0]).unwrap();
        assert_eq!(result.window, vec![40.0, 50.0, 70.0]);
        assert!(!result.is_anomaly);
    }

    #[test]
    fn test_insufficient_history() {
        let scorer = AnomalyScorer::new(persistence_bundle(8.0), ScoringConfig::default()).unwrap();
        assert!(matches!(
            scorer.score(1.0, &[1.0, 2.0]),
            Err(EngineError::InsufficientHistory {
                required: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_deterministic() {
        let scorer = AnomalyScorer::new(persistence_bundle(8.0), ScoringConfig::default()).unwrap();
        let history = [12.5, 13.0, 12.75];
        assert_eq!(
            scorer.score(14.0, &history).unwrap(),
            scorer.score(14.0, &history).unwrap()
        );
    }

    #[test]
    fn test_tightening_is_configurable() {
        let scorer = AnomalyScorer::new(persistence_bundle(8.0), ScoringConfig::new(1.0)).unwrap();
        let result = scorer.score(35.0, &[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(result.effective_threshold, 8.0);
        assert!(!result.is_anomaly);
    }

    #[test]
    fn test_rejects_non_finite_value() {
        let scorer = AnomalyScorer::new(persistence_bundle(8.0), ScoringConfig::default()).unwrap();
        assert!(matches!(
            scorer.score(f64::NAN, &[1.0, 2.0, 3.0]),
            Err(EngineError::InvalidData(_))
        ));
    }

    #[test]
    fn test_rejects_bad_tightening() {
        assert!(AnomalyScorer::new(persistence_bundle(8.0), ScoringConfig::new(0.0)).is_err());
    }
}
