//! Liveness handler.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::server::state::AppState;

/// Response for the health endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: i64,
}

/// Report that the server is up.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_secs(),
    })
}
