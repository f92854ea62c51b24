//! Series store trait definition.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Order, Sample};

/// Append-only ordered store for one named series.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Backend name used in logs and health output.
    fn name(&self) -> &str;

    /// Append a sample. Its timestamp must be greater than every stored one.
    async fn append(&self, sample: Sample) -> Result<()>;

    /// Read samples in `order`. A `limit` of K keeps only the last K
    /// points of the series, whichever order they are returned in.
    async fn range(&self, order: Order, limit: Option<usize>) -> Result<Vec<Sample>>;

    /// The most recent `count` samples, oldest first.
    async fn latest(&self, count: usize) -> Result<Vec<Sample>> {
        self.range(Order::OldestFirst, Some(count)).await
    }

    /// Remove the whole series. Clearing an empty series succeeds.
    async fn clear(&self) -> Result<()>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<()>;
}
