//! Configuration module

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use engine::ScoringConfig;
use series::{StoreConfig, DEFAULT_SERIES_KEY, DEFAULT_TIMEOUT_MS};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ARTIFACT_PATH: &str = "artifacts/bundle.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Bundle written by `cli train`
    pub artifact_path: PathBuf,

    /// Series key, backend and per-call timeout
    pub store: StoreConfig,

    pub scoring: ScoringConfig,

    /// Where the most recent detection is mirrored, if anywhere
    pub last_result_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            store: StoreConfig::default(),
            scoring: ScoringConfig::default(),
            last_result_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`; unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("REDIS_URL").filter(|url| !url.is_empty()) {
            Some(url) => StoreConfig::redis(url),
            None => StoreConfig::memory(),
        }
        .with_series_key(lookup("SERIES_KEY").unwrap_or_else(|| DEFAULT_SERIES_KEY.to_string()))
        .with_timeout_ms(parse_var(&lookup, "STORE_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?);

        let tightening = parse_var(
            &lookup,
            "SCORING_TIGHTENING",
            ScoringConfig::default().tightening,
        )?;
        let scoring = ScoringConfig::new(tightening);
        scoring.validate().map_err(|err| ConfigError::Invalid {
            var: "SCORING_TIGHTENING",
            value: tightening.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            artifact_path: lookup("ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_PATH)),
            store,
            scoring,
            last_result_path: lookup("LAST_RESULT_PATH")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|err: std::net::AddrParseError| ConfigError::Invalid {
            var: "HOST",
            value: addr.clone(),
            reason: err.to_string(),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            reason: err.to_string(),
            value,
        }),
    }
}
