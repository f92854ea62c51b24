//! API route handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use series::{Order, Sample};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// `dd/mm/YYYY HH:MM:SS` rendering of a millisecond timestamp, in UTC.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct ValueQuery {
    pub value: Option<String>,
}

impl ValueQuery {
    fn require(&self) -> ApiResult<&str> {
        self.value.as_deref().ok_or(ApiError::MissingParameter("value"))
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    #[default]
    Desc,
}

impl From<ListOrder> for Order {
    fn from(order: ListOrder) -> Self {
        match order {
            ListOrder::Asc => Order::OldestFirst,
            ListOrder::Desc => Order::NewestFirst,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub order: ListOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleView {
    pub timestamp: i64,
    pub date: String,
    pub value: f64,
}

impl From<&Sample> for SampleView {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp,
            date: format_timestamp(sample.timestamp),
            value: sample.value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub hostname: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    let endpoints = [
        "GET    /                        this page",
        "GET    /health/live             liveness",
        "GET    /health/ready            readiness",
        "POST   /api/v1/samples?value=V  store a measurement",
        "GET    /api/v1/samples          list measurements (?order=asc|desc)",
        "DELETE /api/v1/samples          delete all measurements",
        "POST   /api/v1/detect?value=V   score a measurement, then store it",
    ];
    Json(IndexResponse {
        hostname: state.hostname.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub timestamp: i64,
    pub date: String,
    pub hostname: String,
}

pub async fn ingest(
    State(state): State<AppState>,
    Query(query): Query<ValueQuery>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let timestamp = state.service.ingest(query.require()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            timestamp,
            date: format_timestamp(timestamp),
            hostname: state.hostname.clone(),
        }),
    ))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub hostname: String,
    pub count: usize,
    pub samples: Vec<SampleView>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let samples = state.service.list_all(query.order.into()).await?;
    Ok(Json(ListResponse {
        hostname: state.hostname.clone(),
        count: samples.len(),
        samples: samples.iter().map(SampleView::from).collect(),
    }))
}

pub async fn clear(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    state.service.clear_series().await?;
    Ok(Json(serde_json::json!({ "cleared": true })))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub timestamp: i64,
    pub date: String,
    pub hostname: String,
    pub value: f64,
    pub forecast: f64,
    pub residual: f64,
    pub threshold: f64,
    pub effective_threshold: f64,
    pub is_anomaly: bool,
    pub window: Vec<SampleView>,
}

pub async fn detect(
    State(state): State<AppState>,
    Query(query): Query<ValueQuery>,
) -> ApiResult<Json<DetectResponse>> {
    let detection = state.service.detect(query.require()?).await?;
    if let Some(writer) = &state.last_result {
        writer.write(&detection).await;
    }

    let result = &detection.result;
    Ok(Json(DetectResponse {
        timestamp: detection.timestamp,
        date: format_timestamp(detection.timestamp),
        hostname: state.hostname.clone(),
        value: result.value,
        forecast: result.forecast,
        residual: result.residual,
        threshold: result.threshold,
        effective_threshold: result.effective_threshold,
        is_anomaly: result.is_anomaly,
        window: detection.window.iter().map(SampleView::from).collect(),
    }))
}
