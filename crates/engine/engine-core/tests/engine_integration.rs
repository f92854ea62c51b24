//! Integration tests for engine-core
//!
//! Train from CSV, persist, reload and score through the public API.

use std::io::Write;
use std::sync::Arc;

use engine_api::{
    CalibrationConfig, DistanceMetric, EngineError, HistorySource, RegressorConfig,
    ScoringConfig, SequenceRegressor, TrainingConfig,
};
use engine_core::{AnomalyScorer, ArtifactBundle, CsvHistorySource, TrainingPipeline};

fn temperatures(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            21.0 + 3.0 * (t * std::f64::consts::TAU / 48.0).sin() + 0.2 * (t * 1.7).sin()
        })
        .collect()
}

fn write_history(values: &[f64]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "time,value").unwrap();
    for (i, v) in values.iter().enumerate() {
        writeln!(file, "2024-03-01 {:02}:{:02}:00,{}", i / 60, i % 60, v).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_run_persists_loadable_bundle() {
    let values = temperatures(300);
    let csv = write_history(&values);
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bundle.json");

    let pipeline = TrainingPipeline::new(TrainingConfig::default()).unwrap();
    let outcome = pipeline
        .run(&CsvHistorySource::new(csv.path()), &output)
        .unwrap();

    let loaded = ArtifactBundle::load(&output).unwrap();
    assert_eq!(loaded.window_size(), outcome.bundle.window_size());
    assert_eq!(loaded.threshold(), outcome.bundle.threshold());
    assert_eq!(loaded.summary().series_len, 300);
}

#[test]
fn test_failed_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bundle.json");

    let err = TrainingPipeline::default()
        .run(&vec![5.0; 50], &output)
        .unwrap_err();

    assert!(matches!(err, EngineError::DegenerateRange { .. }));
    assert!(!output.exists());
}

#[test]
fn test_about_one_percent_of_training_windows_exceed_threshold() {
    let values = temperatures(1010);
    let outcome = TrainingPipeline::default().train(&values).unwrap();

    // 1000 windows at the 99th percentile: at most 10 strictly above
    assert_eq!(outcome.calibration.residuals.len(), 1000);
    assert!(outcome.bundle.summary().in_sample_anomalies <= 10);
}

#[test]
fn test_scorer_flags_spike_but_not_normal_value() {
    let values = temperatures(400);
    let outcome = TrainingPipeline::default().train(&values[..350]).unwrap();
    let scorer = AnomalyScorer::new(Arc::new(outcome.bundle), ScoringConfig::default()).unwrap();

    let history = &values[..360];
    let normal = scorer.score(values[360], history).unwrap();
    let spike = scorer.score(values[360] + 25.0, history).unwrap();

    assert!(spike.is_anomaly);
    assert!(spike.residual > normal.residual);
    assert_eq!(normal.window, history[350..].to_vec());
}

#[test]
fn test_knn_regressor_trains_and_scores() {
    let values = temperatures(240);
    let config = TrainingConfig::default()
        .with_window_size(12)
        .with_regressor(RegressorConfig::Knn {
            k: 4,
            metric: DistanceMetric::Euclidean,
        });
    let outcome = TrainingPipeline::new(config).unwrap().train(&values).unwrap();
    assert_eq!(outcome.bundle.regressor().input_size(), Some(12));

    let scorer = AnomalyScorer::new(Arc::new(outcome.bundle), ScoringConfig::default()).unwrap();
    let result = scorer.score(values[239], &values[..239]).unwrap();
    assert_eq!(result.window.len(), 12);
}

#[test]
fn test_lower_percentile_gives_lower_threshold() {
    let values = temperatures(500);
    let strict = TrainingPipeline::new(
        TrainingConfig {
            calibration: CalibrationConfig::new(90.0),
            ..TrainingConfig::default()
        },
    )
    .unwrap()
    .train(&values)
    .unwrap();
    let loose = TrainingPipeline::default().train(&values).unwrap();

    assert!(strict.bundle.threshold() <= loose.bundle.threshold());
    assert_eq!(strict.bundle.percentile(), 90.0);
}

#[test]
fn test_in_memory_source() {
    let source = temperatures(20);
    assert_eq!(source.name(), "in-memory");
    assert_eq!(source.load().unwrap().len(), 20);
}
