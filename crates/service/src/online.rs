//! Ingest / list / clear / detect over one named series.

use std::sync::Arc;

use engine::{AnomalyScorer, ArtifactBundle, DetectionResult, ScoringConfig};
use serde::Serialize;
use series::{sample_values, Order, Sample, SeriesStore};
use tokio::sync::Mutex;

use crate::clock::{now_millis, TimestampClock};
use crate::error::{parse_value, Result, ServiceError};

/// Outcome of one detect call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Timestamp the scored value was stored under.
    pub timestamp: i64,
    /// The samples that formed the window, oldest first.
    pub window: Vec<Sample>,
    pub result: DetectionResult,
}

/// The online service. Cheap to share behind an `Arc`.
///
/// Reads are lock-free. Appends, and the window read that precedes a detect
/// append, run under one async mutex so stored timestamps stay strictly
/// increasing and a detect window is exactly the samples before its value.
pub struct OnlineService {
    store: Arc<dyn SeriesStore>,
    scorer: AnomalyScorer,
    clock: Mutex<TimestampClock>,
}

impl OnlineService {
    pub fn new(
        store: Arc<dyn SeriesStore>,
        bundle: Arc<ArtifactBundle>,
        scoring: ScoringConfig,
    ) -> Result<Self> {
        let scorer = AnomalyScorer::new(bundle, scoring)?;
        tracing::info!(
            store = store.name(),
            window_size = scorer.window_size(),
            threshold = scorer.bundle().threshold(),
            effective_threshold = scorer.effective_threshold(),
            "online service ready"
        );
        Ok(Self {
            store,
            scorer,
            clock: Mutex::new(TimestampClock::new()),
        })
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        self.scorer.bundle()
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    pub fn store(&self) -> &Arc<dyn SeriesStore> {
        &self.store
    }

    /// Check the store answers.
    pub async fn ready(&self) -> Result<()> {
        self.store.ping().await?;
        Ok(())
    }

    /// Store a raw measurement and return the timestamp it was stored under.
    pub async fn ingest(&self, raw: &str) -> Result<i64> {
        let value = parse_value(raw)?;
        let mut clock = self.clock.lock().await;
        let timestamp = self.append(&mut clock, value).await?;
        tracing::debug!(timestamp, value, "sample ingested");
        Ok(timestamp)
    }

    /// Every stored sample in `order`. Empty when the series has no data.
    pub async fn list_all(&self, order: Order) -> Result<Vec<Sample>> {
        Ok(self.store.range(order, None).await?)
    }

    /// Delete the series. Deleting an empty series is not an error.
    pub async fn clear_series(&self) -> Result<()> {
        let _clock = self.clock.lock().await;
        self.store.clear().await?;
        tracing::info!("series cleared");
        Ok(())
    }

    /// Score a raw measurement against the samples stored before it, then
    /// store it. Nothing is stored when scoring fails.
    pub async fn detect(&self, raw: &str) -> Result<Detection> {
        let value = parse_value(raw)?;
        let mut clock = self.clock.lock().await;

        let window = self.store.latest(self.scorer.window_size()).await?;
        let result = self
            .scorer
            .score(value, &sample_values(&window))
            .map_err(ServiceError::from_engine)?;
        let timestamp = self.append(&mut clock, value).await?;

        if result.is_anomaly {
            tracing::warn!(
                timestamp,
                value,
                forecast = result.forecast,
                residual = result.residual,
                effective_threshold = result.effective_threshold,
                "anomaly detected"
            );
        } else {
            tracing::debug!(timestamp, value, residual = result.residual, "value scored");
        }

        Ok(Detection {
            timestamp,
            window,
            result,
        })
    }

    async fn append(&self, clock: &mut TimestampClock, value: f64) -> Result<i64> {
        if !clock.is_seeded() {
            if let Some(last) = self.store.range(Order::NewestFirst, Some(1)).await?.first() {
                *clock = TimestampClock::starting_after(last.timestamp);
            }
        }
        let timestamp = clock.peek(now_millis());
        self.store.append(Sample::new(timestamp, value)).await?;
        clock.commit(timestamp);
        Ok(timestamp)
    }
}
