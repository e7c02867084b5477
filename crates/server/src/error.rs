//! Error types for the prediction service

use algorithm::prelude::ArtifactError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level failures, rendered as `{"error": "..."}` bodies.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Model is not loaded yet. Try again later.")]
    NotReady,

    #[error("An internal server error occurred: {0}")]
    PredictionFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::PredictionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Startup failures; any of these aborts the process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load model: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Model already loaded")]
    AlreadyLoaded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotReady.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::PredictionFailed("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_prefix() {
        let err = ApiError::PredictionFailed("non-finite estimate".into());
        assert_eq!(
            err.to_string(),
            "An internal server error occurred: non-finite estimate"
        );
    }
}
