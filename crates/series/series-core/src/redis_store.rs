//! RedisTimeSeries-backed store.
//!
//! Every command runs under the configured timeout; a timeout or a
//! connection failure surfaces as [`StoreError::Unavailable`].

use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{Cmd, ErrorKind, FromRedisValue, RedisError};
use async_trait::async_trait;
use series_api::{Order, Result, Sample, SeriesStore, StoreConfig, StoreError};

fn unavailable(err: RedisError) -> StoreError {
    match err.kind() {
        ErrorKind::TypeError => StoreError::Malformed(err.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

/// Store holding one series under a RedisTimeSeries key.
///
/// RedisTimeSeries accepts out-of-order inserts, so timestamp ordering is
/// the caller's responsibility here.
#[derive(Clone)]
pub struct RedisSeriesStore {
    key: String,
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisSeriesStore {
    pub async fn connect(url: &str, config: &StoreConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = ::redis::Client::open(url).map_err(unavailable)?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Unavailable(format!("connect timed out after {timeout:?}")))?
            .map_err(unavailable)?;

        tracing::info!(series = %config.series_key, "connected to redis series store");
        Ok(Self {
            key: config.series_key.clone(),
            conn,
            timeout,
        })
    }

    async fn exec<T: FromRedisValue>(&self, cmd: Cmd) -> Result<T> {
        let mut conn = self.conn.clone();
        let reply: std::result::Result<T, RedisError> =
            tokio::time::timeout(self.timeout, cmd.query_async(&mut conn))
                .await
                .map_err(|_| {
                    StoreError::Unavailable(format!("command timed out after {:?}", self.timeout))
                })?;
        reply.map_err(unavailable)
    }

    async fn exists(&self) -> Result<bool> {
        let mut cmd = ::redis::cmd("EXISTS");
        cmd.arg(&self.key);
        let count: i64 = self.exec(cmd).await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl SeriesStore for RedisSeriesStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn append(&self, sample: Sample) -> Result<()> {
        if !sample.value.is_finite() {
            return Err(StoreError::InvalidValue(sample.value.to_string()));
        }
        let mut cmd = ::redis::cmd("TS.ADD");
        cmd.arg(&self.key).arg(sample.timestamp).arg(sample.value);
        let _stored: i64 = self.exec(cmd).await?;
        Ok(())
    }

    async fn range(&self, order: Order, limit: Option<usize>) -> Result<Vec<Sample>> {
        if limit == Some(0) || !self.exists().await? {
            return Ok(Vec::new());
        }
        // COUNT caps from the start of the scan, so a capped read always
        // scans newest first and is flipped afterwards when needed.
        let reverse = limit.is_some() || order == Order::NewestFirst;
        let mut cmd = ::redis::cmd(if reverse { "TS.REVRANGE" } else { "TS.RANGE" });
        cmd.arg(&self.key).arg("-").arg("+");
        if let Some(count) = limit {
            cmd.arg("COUNT").arg(count);
        }
        let rows: Vec<(i64, f64)> = self.exec(cmd).await?;
        let mut samples: Vec<Sample> = rows
            .into_iter()
            .map(|(timestamp, value)| Sample { timestamp, value })
            .collect();
        if reverse && order == Order::OldestFirst {
            samples.reverse();
        }
        Ok(samples)
    }

    async fn clear(&self) -> Result<()> {
        let mut cmd = ::redis::cmd("DEL");
        cmd.arg(&self.key);
        let removed: i64 = self.exec(cmd).await?;
        tracing::debug!(series = %self.key, removed, "series cleared");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let _pong: String = self.exec(::redis::cmd("PING")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_errors_are_malformed() {
        let err = RedisError::from((ErrorKind::TypeError, "response was of incompatible type"));
        assert!(matches!(unavailable(err), StoreError::Malformed(_)));
    }

    #[test]
    fn test_io_and_server_errors_are_unavailable() {
        let io = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert!(matches!(unavailable(io), StoreError::Unavailable(_)));

        let server = RedisError::from((ErrorKind::ResponseError, "ERR unknown command"));
        assert!(matches!(unavailable(server), StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = StoreConfig::redis("redis://127.0.0.1:1").with_timeout_ms(300);
        let result = RedisSeriesStore::connect("redis://127.0.0.1:1", &config).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_bad_url_is_unavailable() {
        let config = StoreConfig::redis("not a url");
        let result = RedisSeriesStore::connect("not a url", &config).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    /// Needs a RedisTimeSeries server at `REDIS_URL` (default localhost).
    #[tokio::test]
    #[ignore]
    async fn test_round_trip_against_live_server() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let config = StoreConfig::redis(&url).with_series_key("series-core-live-test");
        let store = RedisSeriesStore::connect(&url, &config).await.unwrap();
        store.clear().await.unwrap();

        // missing key reads as empty
        assert!(store.range(Order::NewestFirst, None).await.unwrap().is_empty());
        assert!(store.latest(3).await.unwrap().is_empty());

        for ts in 1..=5i64 {
            store.append(Sample::new(ts, ts as f64 * 1.5)).await.unwrap();
        }
        let newest = store.range(Order::NewestFirst, Some(2)).await.unwrap();
        assert_eq!(newest, vec![Sample::new(5, 7.5), Sample::new(4, 6.0)]);
        let latest = store.latest(2).await.unwrap();
        assert_eq!(latest, vec![Sample::new(4, 6.0), Sample::new(5, 7.5)]);
        assert_eq!(store.range(Order::OldestFirst, None).await.unwrap().len(), 5);

        store.ping().await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.range(Order::OldestFirst, None).await.unwrap().is_empty());
    }
}
