//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness probe - is the server running?
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe - can the store be reached?
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let bundle = state.service.bundle();
    let model = json!({
        "window_size": bundle.window_size(),
        "threshold": bundle.threshold(),
        "percentile": bundle.percentile(),
        "trained_at": bundle.summary().trained_at,
    });

    match state.service.ready().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "version": env!("CARGO_PKG_VERSION"),
                "store": state.service.store().name(),
                "model": model,
            })),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "version": env!("CARGO_PKG_VERSION"),
                    "store": state.service.store().name(),
                    "error": err.to_string(),
                })),
            )
        }
    }
}
