//! System health handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::api::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check. Never touches sessions or the upstream API.
#[instrument(skip_all)]
pub async fn health<S: Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version().to_string(),
    })
}
