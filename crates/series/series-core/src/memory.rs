//! Process-local series store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use series_api::{Order, Result, Sample, SeriesStore, StoreError};

/// Series kept in a `BTreeMap` keyed by timestamp.
#[derive(Debug, Default)]
pub struct InMemorySeriesStore {
    key: String,
    samples: RwLock<BTreeMap<i64, f64>>,
}

impl InMemorySeriesStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            samples: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }
}

#[async_trait]
impl SeriesStore for InMemorySeriesStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, sample: Sample) -> Result<()> {
        if !sample.value.is_finite() {
            return Err(StoreError::InvalidValue(sample.value.to_string()));
        }
        let mut samples = self.samples.write();
        if let Some((&last, _)) = samples.last_key_value() {
            if sample.timestamp <= last {
                return Err(StoreError::OutOfOrder {
                    timestamp: sample.timestamp,
                    last,
                });
            }
        }
        samples.insert(sample.timestamp, sample.value);
        Ok(())
    }

    async fn range(&self, order: Order, limit: Option<usize>) -> Result<Vec<Sample>> {
        let samples = self.samples.read();
        let limit = limit.unwrap_or(usize::MAX);
        let to_sample = |(&timestamp, &value): (&i64, &f64)| Sample { timestamp, value };
        let skip = samples.len().saturating_sub(limit);
        Ok(match order {
            Order::OldestFirst => samples.iter().skip(skip).map(to_sample).collect(),
            Order::NewestFirst => samples.iter().rev().take(limit).map(to_sample).collect(),
        })
    }

    async fn clear(&self) -> Result<()> {
        self.samples.write().clear();
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
