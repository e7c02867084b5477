//! API route handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use data_spi::month_start;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::state::AppState;

pub const INVALID_FIELDS_MESSAGE: &str =
    "Invalid year or month. Year must be an integer, month must be an integer between 1 and 12.";

/// A validated `/predict` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionRequest {
    pub year: i32,
    pub month: u32,
}

impl PredictionRequest {
    /// Validate an already-parsed JSON body.
    ///
    /// Both keys must be present, both values must be JSON integers and the
    /// month must lie in 1..=12. Floats, strings and booleans are rejected.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let fields = body.as_object().ok_or_else(|| {
            ApiError::InvalidRequest(
                "Request body must be a JSON object with \"year\" and \"month\".".to_string(),
            )
        })?;

        let year = required(fields, "year")?;
        let month = required(fields, "month")?;

        let (Some(year), Some(month)) = (year.as_i64(), month.as_i64()) else {
            return Err(invalid_fields());
        };
        if !(1..=12).contains(&month) {
            return Err(invalid_fields());
        }

        let year = i32::try_from(year)
            .ok()
            .filter(|&y| month_start(y, month as u32).is_some())
            .ok_or_else(|| {
                ApiError::InvalidRequest(format!(
                    "Year {} is outside the supported calendar range.",
                    year
                ))
            })?;

        Ok(Self {
            year,
            month: month as u32,
        })
    }
}

fn required<'a>(fields: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ApiError> {
    fields.get(key).ok_or_else(|| {
        ApiError::InvalidRequest(format!(
            "Missing key in request data: '{}'. Expected \"year\" and \"month\".",
            key
        ))
    })
}

fn invalid_fields() -> ApiError {
    ApiError::InvalidRequest(INVALID_FIELDS_MESSAGE.to_string())
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictionResponse {
    pub prediction: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// `POST /predict`
///
/// The body is read raw so that any content type carrying JSON is accepted.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "rejecting unparseable request body");
        ApiError::InvalidRequest(format!("Request body is not valid JSON: {}", e))
    })?;

    let request = PredictionRequest::from_json(&payload)?;
    debug!(year = request.year, month = request.month, "prediction requested");

    let model = state.model.get().ok_or(ApiError::NotReady)?;

    let forecast = model
        .predict_month(request.year, request.month)
        .map_err(|e| {
            error!(error = %e, year = request.year, month = request.month, "prediction failed");
            ApiError::PredictionFailed(e.to_string())
        })?;

    if !forecast.yhat.is_finite() {
        error!(year = request.year, month = request.month, "model produced a non-finite estimate");
        return Err(ApiError::PredictionFailed(
            "model produced a non-finite estimate".to_string(),
        ));
    }

    info!(
        year = request.year,
        month = request.month,
        prediction = forecast.yhat,
        "prediction served"
    );
    Ok(Json(PredictionResponse {
        prediction: forecast.yhat,
    }))
}

/// `GET /health`: always 200, reports whether a model is loaded.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.model.is_ready(),
    })
}

/// Liveness probe - is the server running?
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe - is the model loaded?
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let ready = state.model.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if ready { "ready" } else { "unavailable" },
            "version": env!("CARGO_PKG_VERSION"),
            "model_loaded": ready
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: Value) -> Result<PredictionRequest, ApiError> {
        PredictionRequest::from_json(&body)
    }

    #[test]
    fn test_valid_request() {
        let request = parse(json!({"year": 2021, "month": 1})).unwrap();
        assert_eq!(request, PredictionRequest { year: 2021, month: 1 });
    }

    #[test]
    fn test_extra_keys_ignored() {
        let request = parse(json!({"year": 2021, "month": 12, "note": "x"})).unwrap();
        assert_eq!(request.month, 12);
    }

    #[test]
    fn test_missing_key_names_the_key() {
        let err = parse(json!({"year": 2021})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing key in request data: 'month'. Expected \"year\" and \"month\"."
        );

        let err = parse(json!({"month": 1})).unwrap_err();
        assert!(err.to_string().contains("'year'"));
    }

    #[test]
    fn test_non_integer_fields_rejected() {
        for body in [
            json!({"year": "2021", "month": 1}),
            json!({"year": 2021, "month": "1"}),
            json!({"year": 2021.5, "month": 1}),
            json!({"year": 2021, "month": 1.0}),
            json!({"year": true, "month": 1}),
            json!({"year": null, "month": 1}),
        ] {
            let err = parse(body).unwrap_err();
            assert_eq!(err, ApiError::InvalidRequest(INVALID_FIELDS_MESSAGE.to_string()));
        }
    }

    #[test]
    fn test_month_out_of_range() {
        for month in [0, 13, -1] {
            let err = parse(json!({"year": 2021, "month": month})).unwrap_err();
            assert_eq!(err.to_string(), INVALID_FIELDS_MESSAGE);
        }
    }

    #[test]
    fn test_year_out_of_calendar_range() {
        let err = parse(json!({"year": 10_000_000_000i64, "month": 1})).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("calendar range"));
    }

    #[test]
    fn test_non_object_body() {
        for body in [json!([2021, 1]), json!("2021-01"), json!(null)] {
            let err = parse(body).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
