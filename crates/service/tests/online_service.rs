use std::sync::Arc;

use engine::{ArtifactBundle, ScoringConfig, TrainingConfig, TrainingPipeline};
use series::{InMemorySeriesStore, Order, SeriesStore};
use service::{OnlineService, ServiceError};

const WINDOW: usize = 3;

fn history() -> Vec<f64> {
    (0..80)
        .map(|i| {
            let t = i as f64;
            50.0 + 10.0 * (t * 0.3).sin() + 2.0 * ((t * 1.7).sin() * 3.1).fract()
        })
        .collect()
}

fn bundle() -> Arc<ArtifactBundle> {
    let pipeline = TrainingPipeline::new(TrainingConfig::default().with_window_size(WINDOW)).unwrap();
    Arc::new(pipeline.train(&history()).unwrap().bundle)
}

fn service() -> (OnlineService, Arc<InMemorySeriesStore>) {
    let store = Arc::new(InMemorySeriesStore::new("test"));
    let service = OnlineService::new(store.clone(), bundle(), ScoringConfig::default()).unwrap();
    (service, store)
}

#[tokio::test]
async fn test_ingest_then_list() {
    let (service, _) = service();
    let first = service.ingest("21.5").await.unwrap();
    let second = service.ingest("22").await.unwrap();
    assert!(second > first);

    let newest = service.list_all(Order::NewestFirst).await.unwrap();
    assert_eq!(
        newest.iter().map(|s| s.value).collect::<Vec<_>>(),
        vec![22.0, 21.5]
    );
    let oldest = service.list_all(Order::OldestFirst).await.unwrap();
    assert_eq!(oldest[0].timestamp, first);
}

#[tokio::test]
async fn test_list_empty_series() {
    let (service, _) = service();
    assert!(service.list_all(Order::NewestFirst).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_rejects_non_numeric_without_mutation() {
    let (service, store) = service();
    service.ingest("1").await.unwrap();

    let err = service.ingest("abc").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidValue(ref raw) if raw == "abc"));
    assert_eq!(store.len(), 1);

    assert!(matches!(
        service.detect("abc").await,
        Err(ServiceError::InvalidValue(_))
    ));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_detect_requires_a_full_window() {
    let (service, store) = service();
    service.ingest("50").await.unwrap();
    service.ingest("51").await.unwrap();

    let err = service.detect("52").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InsufficientHistory {
            required: WINDOW,
            got: 2
        }
    ));
    // Failed detects do not store the value.
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_detect_window_excludes_the_scored_value() {
    let (service, store) = service();
    let values = history();
    for value in &values[..WINDOW + 2] {
        service.ingest(&value.to_string()).await.unwrap();
    }

    let detection = service.detect("50.5").await.unwrap();
    let expected: Vec<f64> = values[2..WINDOW + 2].to_vec();
    assert_eq!(detection.result.window, expected);
    assert_eq!(
        detection.window.iter().map(|s| s.value).collect::<Vec<_>>(),
        expected
    );
    assert!(detection.window.iter().all(|s| s.timestamp < detection.timestamp));

    // The value is stored after scoring, under the returned timestamp.
    let newest = store.range(Order::NewestFirst, Some(1)).await.unwrap();
    assert_eq!(newest[0].timestamp, detection.timestamp);
    assert_eq!(newest[0].value, 50.5);
}

#[tokio::test]
async fn test_detect_flags_spike() {
    let (service, _) = service();
    for value in &history()[..WINDOW] {
        service.ingest(&value.to_string()).await.unwrap();
    }

    let detection = service.detect("1000").await.unwrap();
    assert!(detection.result.is_anomaly);
    assert_eq!(detection.result.value, 1000.0);
    assert_eq!(detection.result.threshold, service.bundle().threshold());
}

#[tokio::test]
async fn test_detect_is_deterministic_for_same_window() {
    let (service, store) = service();
    for value in &history()[..WINDOW] {
        service.ingest(&value.to_string()).await.unwrap();
    }
    let first = service.detect("48").await.unwrap();

    store.clear().await.unwrap();
    for value in &history()[..WINDOW] {
        service.ingest(&value.to_string()).await.unwrap();
    }
    let second = service.detect("48").await.unwrap();

    assert_eq!(first.result, second.result);
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let (service, _) = service();
    service.clear_series().await.unwrap();
    service.ingest("3").await.unwrap();
    service.clear_series().await.unwrap();
    service.clear_series().await.unwrap();
    assert!(service.list_all(Order::OldestFirst).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_timestamps_strictly_increase_under_concurrent_ingest() {
    let (service, _) = service();
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for worker in 0..5 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..20 {
                service.ingest(&format!("{worker}.{i}")).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let samples = service.list_all(Order::OldestFirst).await.unwrap();
    assert_eq!(samples.len(), 100);
    assert!(samples.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
}

#[tokio::test]
async fn test_clock_resumes_after_existing_data() {
    let store = Arc::new(InMemorySeriesStore::new("test"));
    let future = service::now_millis() + 60_000;
    store.append(series::Sample::new(future, 1.0)).await.unwrap();

    let service = OnlineService::new(store.clone(), bundle(), ScoringConfig::default()).unwrap();
    let stored = service.ingest("2").await.unwrap();
    assert_eq!(stored, future + 1);
}

#[tokio::test]
async fn test_ready_pings_store() {
    let (service, _) = service();
    service.ready().await.unwrap();
}
