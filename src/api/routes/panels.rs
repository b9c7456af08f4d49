//! Panel Routes
//!
//! Rendered dashboard and per-panel views.
//!
//! - GET / - Full dashboard page
//! - GET /panels/:attr - HTML fragment for one panel
//! - GET /api/v1/panels - JSON view of every panel
//! - GET /api/v1/panels/:attr - JSON view of one panel

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PanelListResponse, PanelResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::panel::{PanelStore, Team};
use crate::render::{render_page, render_panel};

/// GET /
pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let views = state.dashboard.views().await;
    Html(render_page(&views, state.dashboard.refresh_interval()))
}

/// GET /panels/:attr
pub async fn panel_fragment(
    State(state): State<Arc<AppState>>,
    Path(attr): Path<String>,
) -> ApiResult<Html<String>> {
    let store = mounted_store(&state, &attr)?;
    Ok(Html(render_panel(store.team(), &store.view().await)))
}

/// GET /api/v1/panels
pub async fn list_panels(State(state): State<Arc<AppState>>) -> Json<PanelListResponse> {
    let mut panels = Vec::new();
    for team in state.dashboard.teams() {
        if let Some(store) = state.dashboard.store(team) {
            panels.push(PanelResponse::new(team, &store.snapshot().await));
        }
    }

    Json(PanelListResponse {
        panels,
        refresh_interval_ms: state.dashboard.refresh_interval().as_millis() as u64,
    })
}

/// GET /api/v1/panels/:attr
pub async fn get_panel(
    State(state): State<Arc<AppState>>,
    Path(attr): Path<String>,
) -> ApiResult<Json<PanelResponse>> {
    let store = mounted_store(&state, &attr)?;
    Ok(Json(PanelResponse::new(store.team(), &store.snapshot().await)))
}

fn mounted_store<'a>(state: &'a AppState, attr: &str) -> ApiResult<&'a PanelStore> {
    let team = Team::from_attribute(attr)?;
    state
        .dashboard
        .store(team)
        .ok_or_else(|| ApiError::NotFound(format!("No panel mounted for attribute {}", attr)))
}
