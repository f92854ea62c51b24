//! Series Store API
//!
//! Configuration types for selecting and tuning a series store backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use series_spi::{sample_values, Order, Result, Sample, SeriesStore, StoreError};

/// Series key used when none is configured.
pub const DEFAULT_SERIES_KEY: &str = "measurements";

/// Per-command timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Which backend holds the series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store; contents are lost on restart.
    #[default]
    Memory,
    /// RedisTimeSeries at `url`, e.g. `redis://localhost:6379/0`.
    Redis { url: String },
}

/// Series store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name of the single series.
    pub series_key: String,
    pub backend: StoreBackend,
    /// Connect and command timeout, in milliseconds (default: 2000).
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            series_key: DEFAULT_SERIES_KEY.to_string(),
            backend: StoreBackend::Memory,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: StoreBackend::Redis { url: url.into() },
            ..Self::default()
        }
    }

    pub fn with_series_key(mut self, key: impl Into<String>) -> Self {
        self.series_key = key.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.series_key, "measurements");
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_redis_builder() {
        let config = StoreConfig::redis("redis://cache:6379/0")
            .with_series_key("temps")
            .with_timeout_ms(500);
        assert_eq!(
            config.backend,
            StoreBackend::Redis {
                url: "redis://cache:6379/0".to_string()
            }
        );
        assert_eq!(config.series_key, "temps");
        assert_eq!(config.timeout_ms, 500);
    }

    #[test]
    fn test_backend_serde() {
        let json = serde_json::to_string(&StoreBackend::Memory).unwrap();
        assert_eq!(json, r#"{"kind":"memory"}"#);
    }
}
