//! API error types and handling.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gapwise::GapwiseError;
use gapwise::remote::ErrorResponse;
use tokio::task::JoinError;
use tracing::warn;

/// API error type. Every variant renders as `{ "error": message }`.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from client.
    BadRequest(String),
    /// Request body rejected before it reached a handler.
    Body(StatusCode, String),
    /// Error from the gapwise library.
    Gapwise(GapwiseError),
    /// A worker task failed.
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Body(status, _) => *status,
            ApiError::Gapwise(e) if e.is_precondition() => StatusCode::BAD_REQUEST,
            ApiError::Gapwise(GapwiseError::Config(_) | GapwiseError::Json(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Gapwise(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Body(_, msg) | ApiError::Internal(msg) => msg,
            ApiError::Gapwise(e) => e.to_string(),
        };
        warn!(status = status.as_u16(), %message, "request failed");

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<GapwiseError> for ApiError {
    fn from(err: GapwiseError) -> Self {
        ApiError::Gapwise(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.status(), rejection.body_text())
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        ApiError::Internal(format!("Worker task failed: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Body(status, msg) => write!(f, "Rejected body ({}): {}", status, msg),
            ApiError::Gapwise(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
