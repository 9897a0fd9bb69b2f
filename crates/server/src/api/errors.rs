//! API error responses.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use wheel_core::EngineError;

use crate::jobs::JobLimitReached;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map an engine error to a status code and body.
pub fn engine_error(e: EngineError) -> ApiError {
    let status = match &e {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        EngineError::Cancelled => StatusCode::CONFLICT,
        EngineError::InfeasibleResidual { .. } | EngineError::Join(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            kind: e.kind().to_string(),
        }),
    )
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
            kind: "not_found".to_string(),
        }),
    )
}

pub fn too_many_jobs(e: JobLimitReached) -> ApiError {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse {
            error: e.to_string(),
            kind: "too_many_jobs".to_string(),
        }),
    )
}
