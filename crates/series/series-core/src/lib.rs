//! Series Store Core
//!
//! Store implementations and the factory that picks one from configuration.

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

use std::sync::Arc;

use series_api::{Result, SeriesStore, StoreBackend, StoreConfig};

pub use memory::InMemorySeriesStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisSeriesStore;

/// Open the configured backend.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn SeriesStore>> {
    match &config.backend {
        StoreBackend::Memory => {
            tracing::info!(series = %config.series_key, "using in-memory series store");
            Ok(Arc::new(InMemorySeriesStore::new(&config.series_key)))
        }
        #[cfg(feature = "redis")]
        StoreBackend::Redis { url } => {
            let store = RedisSeriesStore::connect(url, config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis { .. } => Err(series_api::StoreError::Unavailable(
            "redis backend requested but this build lacks the `redis` feature".to_string(),
        )),
    }
}
