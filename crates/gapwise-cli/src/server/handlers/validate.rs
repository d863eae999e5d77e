//! Series validation handler.

use axum::{Json, extract::rejection::JsonRejection};
use gapwise::remote::{ValidationRequest, ValidationResponse};
use tracing::debug;

use crate::server::error::ApiError;

/// Validate the posted rows against the posted forecast config.
///
/// A summary with critical breaks is still a 200; only malformed requests
/// and failed preconditions produce an error payload.
pub async fn validate_series(
    payload: Result<Json<ValidationRequest>, JsonRejection>,
) -> Result<Json<ValidationResponse>, ApiError> {
    let Json(request) = payload?;
    debug!(rows = request.data.len(), "validating series");

    let response = tokio::task::spawn_blocking(move || request.execute()).await??;
    Ok(Json(response))
}
