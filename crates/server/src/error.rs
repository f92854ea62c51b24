//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use series::StoreError;
use service::ServiceError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing query parameter `{0}`")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::InvalidValue(_) => StatusCode::BAD_REQUEST,
                ServiceError::InsufficientHistory { .. } => StatusCode::CONFLICT,
                ServiceError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::Store(StoreError::InvalidValue(_)) => StatusCode::BAD_REQUEST,
                ServiceError::Store(_) | ServiceError::Engine(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::EngineError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::MissingParameter("value"), StatusCode::BAD_REQUEST),
            (
                ServiceError::InvalidValue("abc".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::InsufficientHistory {
                    required: 10,
                    got: 3,
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Store(StoreError::Unavailable("timed out".into())).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ServiceError::Store(StoreError::Malformed("bad reply".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Engine(EngineError::NotFitted).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }
}
