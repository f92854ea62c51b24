//! # server
//!
//! HTTP surface for the online anomaly detection service: ingest, list,
//! clear and detect over one named series, plus health probes.

pub mod config;
pub mod error;
mod health;
pub mod last_result;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use engine::ArtifactBundle;
use series::SeriesStore;
use service::OnlineService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use last_result::{LastResult, LastResultWriter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OnlineService>,
    pub hostname: String,
    pub last_result: Option<LastResultWriter>,
}

impl AppState {
    pub fn new(service: Arc<OnlineService>) -> Self {
        Self {
            service,
            hostname: local_hostname(),
            last_result: None,
        }
    }

    pub fn with_last_result(mut self, writer: Option<LastResultWriter>) -> Self {
        self.last_result = writer;
        self
    }
}

fn local_hostname() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Install the global tracing subscriber (`RUST_LOG`, default
/// `server=info,tower_http=info`). Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,service=info,tower_http=info".into()),
        )
        .try_init();
}

/// Build the router with middleware
pub fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::index))
        // Health endpoints (Kubernetes-compatible)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // API endpoints
        .route(
            "/api/v1/samples",
            post(routes::ingest).get(routes::list).delete(routes::clear),
        )
        .route("/api/v1/detect", post(routes::detect))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load the bundle, open the store and assemble the state.
///
/// A bundle that cannot be loaded is fatal.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let bundle = ArtifactBundle::load(&config.artifact_path).with_context(|| {
        format!(
            "refusing to start: cannot load bundle {}",
            config.artifact_path.display()
        )
    })?;
    let store: Arc<dyn SeriesStore> = series::connect(&config.store)
        .await
        .context("cannot open series store")?;
    let service = OnlineService::new(store, Arc::new(bundle), config.scoring)?;

    Ok(AppState::new(Arc::new(service))
        .with_last_result(config.last_result_path.clone().map(LastResultWriter::new)))
}

/// Serve until the process is stopped.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let state = build_state(&config).await?;
    let app = app(state);

    tracing::info!("server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
