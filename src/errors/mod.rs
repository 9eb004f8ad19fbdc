use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// Errors raised by the detector for malformed input.
///
/// "No pattern found" is not an error; short or flat series yield an empty result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("malformed series at index {index}: {reason}")]
    MalformedSeries { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Upstream(message) => (StatusCode::BAD_GATEWAY, message.clone()),
        };

        let body = Json(ErrorResponse { message });
        (status, body).into_response()
    }
}

impl From<DetectionError> for AppError {
    fn from(error: DetectionError) -> Self {
        AppError::Validation(error.to_string())
    }
}
