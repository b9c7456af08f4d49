//! Scoreboard panels
//!
//! A panel shows one team's goal attribute. Its state is written by the
//! poller and read by the renderer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::series::AttributeSeries;

/// Bar color for the blue team
pub const BLUE: &str = "#007bff";

/// Bar color for the red team
pub const RED: &str = "#dc3545";

/// Team whose goals a panel tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Blue,
    Red,
}

/// Errors raised when building panels
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    #[error("Unsupported attribute: {0} (expected \"gb\" or \"gr\")")]
    UnsupportedAttribute(String),

    #[error("Refresh interval must be greater than zero")]
    ZeroInterval,
}

impl Team {
    /// Look up the team for a history attribute
    pub fn from_attribute(attr: &str) -> Result<Self, PanelError> {
        match attr {
            "gb" => Ok(Team::Blue),
            "gr" => Ok(Team::Red),
            other => Err(PanelError::UnsupportedAttribute(other.to_string())),
        }
    }

    /// History attribute holding this team's goals
    pub fn attribute(&self) -> &'static str {
        match self {
            Team::Blue => "gb",
            Team::Red => "gr",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Team::Blue => "Goals – Blue Team",
            Team::Red => "Goals – Red Team",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Team::Blue => BLUE,
            Team::Red => RED,
        }
    }
}

impl FromStr for Team {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::from_attribute(s)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// Mutable state behind one panel
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    /// A poll cycle is in flight
    pub loading: bool,
    /// Last published series
    pub series: AttributeSeries,
    /// A non-empty series has been shown at least once
    pub ever_populated: bool,
    /// When the series was last replaced
    pub updated_at: Option<DateTime<Utc>>,
}

impl PanelState {
    /// Replace the series wholesale
    pub fn publish(&mut self, series: AttributeSeries) {
        if !series.is_empty() {
            self.ever_populated = true;
        }
        self.series = series;
        self.updated_at = Some(Utc::now());
    }
}

/// What the renderer shows for a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelView {
    /// Fetch in flight, nothing shown yet
    Loading,
    /// No samples to show
    Empty,
    /// At least one sample
    Populated { series: AttributeSeries },
}

impl PanelView {
    /// Pick the view for the current state.
    ///
    /// Populated wins whenever there are samples. With no samples the panel
    /// shows Loading only while a fetch is in flight and nothing has ever
    /// been shown; otherwise Empty.
    pub fn from_state(state: &PanelState) -> Self {
        if !state.series.is_empty() {
            PanelView::Populated {
                series: state.series.clone(),
            }
        } else if state.loading && !state.ever_populated {
            PanelView::Loading
        } else {
            PanelView::Empty
        }
    }
}

/// Shared, lockable panel state
#[derive(Debug, Clone)]
pub struct PanelStore {
    team: Team,
    state: Arc<RwLock<PanelState>>,
}

impl PanelStore {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            state: Arc::new(RwLock::new(PanelState {
                series: AttributeSeries {
                    attribute: team.attribute().to_string(),
                    samples: Vec::new(),
                },
                ..PanelState::default()
            })),
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub async fn set_loading(&self, loading: bool) {
        self.state.write().await.loading = loading;
    }

    pub async fn publish(&self, series: AttributeSeries) {
        self.state.write().await.publish(series);
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> PanelState {
        self.state.read().await.clone()
    }

    /// Current view
    pub async fn view(&self) -> PanelView {
        PanelView::from_state(&*self.state.read().await)
    }
}
