//! Health Routes
//!
//! Health check endpoints for monitoring.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Status with mounted panels

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Reports which panels are mounted. The history API is not probed: an
/// outage there only shows up as panels with no data.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.dashboard.is_mounted() {
        "healthy"
    } else {
        "stopping"
    };

    Json(HealthResponse {
        status: status.to_string(),
        panels: state
            .dashboard
            .teams()
            .iter()
            .map(|t| t.attribute().to_string())
            .collect(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
