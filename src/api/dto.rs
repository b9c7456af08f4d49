//! Data Transfer Objects
//!
//! Response types for the JSON endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::panel::{PanelState, PanelView, Team};

// ============================================
// PANEL DTOs
// ============================================

/// One panel as seen by the renderer
#[derive(Debug, Serialize)]
pub struct PanelResponse {
    /// History attribute ("gb" or "gr")
    pub attribute: String,
    /// Panel title
    pub title: String,
    /// Bar color (hex)
    pub color: String,
    /// Whether a poll cycle is in flight
    pub loading: bool,
    /// When the series was last replaced (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Loading / empty / populated, with the series when populated
    #[serde(flatten)]
    pub view: PanelView,
}

impl PanelResponse {
    pub fn new(team: Team, state: &PanelState) -> Self {
        Self {
            attribute: team.attribute().to_string(),
            title: team.title().to_string(),
            color: team.color().to_string(),
            loading: state.loading,
            updated_at: state.updated_at,
            view: PanelView::from_state(state),
        }
    }
}

/// All mounted panels
#[derive(Debug, Serialize)]
pub struct PanelListResponse {
    pub panels: Vec<PanelResponse>,
    /// Poll interval in milliseconds
    pub refresh_interval_ms: u64,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" while panels are mounted, "stopping" otherwise
    pub status: String,
    /// Attributes with a mounted panel
    pub panels: Vec<String>,
    /// Seconds since the server started
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
}
