//! # Placar
//!
//! Live scoreboard dashboard for a FIWARE deployment. Goal counters for the
//! blue (`gb`) and red (`gr`) teams are read from an STH-Comet context-history
//! API and shown as a bar chart plus a table, refreshed on a fixed interval.
//!
//! ## Modules
//!
//! - [`sth`]: History API client and response envelope
//! - [`series`]: Envelope values reshaped into chartable samples
//! - [`timefmt`]: Short local time labels
//! - [`lifecycle`]: Subscriptions and cancellable repeating tasks
//! - [`panel`]: Per-team panel state and views
//! - [`poller`]: Fetch-parse-publish cycle for one attribute
//! - [`dashboard`]: Mounted panels and their pollers
//! - [`render`]: SVG chart and HTML rendering
//! - [`api`]: HTTP server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use placar::{Config, Dashboard, StHistoryClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let source = Arc::new(StHistoryClient::new(&config.sth)?);
//!     let dashboard = Dashboard::mount(&config.dashboard.attributes, &config.sth, source)?;
//!
//!     tokio::time::sleep(config.sth.refresh_interval()).await;
//!     for (team, view) in dashboard.views().await {
//!         println!("{}: {:?}", team.title(), view);
//!     }
//!
//!     dashboard.unmount();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod lifecycle;
pub mod panel;
pub mod poller;
pub mod render;
pub mod series;
pub mod sth;
pub mod timefmt;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, DashboardConfig, LoggingConfig, SthConfig};

pub use dashboard::Dashboard;

pub use lifecycle::{schedule, Subscription, TaskHandle};

pub use panel::{PanelError, PanelState, PanelStore, PanelView, Team};

pub use poller::{CycleOutcome, Poller};

pub use series::{AttributeSeries, DisplaySample, Sample};

pub use sth::{FetchError, FetchResult, HistoryEnvelope, HistorySource, StHistoryClient};

pub use timefmt::format_short_time;
