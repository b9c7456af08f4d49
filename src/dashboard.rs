//! Dashboard
//!
//! Owns the mounted panels. Mounting a panel creates its store and
//! subscription and starts its poller; unmounting disposes the subscription
//! and cancels the poller, so late responses are discarded.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SthConfig;
use crate::lifecycle::{Subscription, TaskHandle};
use crate::panel::{PanelError, PanelStore, PanelView, Team};
use crate::poller::Poller;
use crate::sth::HistorySource;

/// A panel with a running poller
struct MountedPanel {
    store: PanelStore,
    subscription: Subscription,
    task: TaskHandle,
}

impl MountedPanel {
    fn unmount(&self) {
        self.subscription.dispose();
        self.task.cancel();
    }
}

/// The set of panels shown on the page
pub struct Dashboard {
    panels: Vec<MountedPanel>,
    refresh_interval: Duration,
}

impl Dashboard {
    /// Mount one panel per attribute and start polling.
    ///
    /// Fails before starting anything if an attribute has no team mapping or
    /// the refresh interval is zero.
    /// Repeated attributes are mounted once.
    pub fn mount(
        attributes: &[String],
        config: &SthConfig,
        source: Arc<dyn HistorySource>,
    ) -> Result<Self, PanelError> {
        let mut teams: Vec<Team> = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let team = Team::from_attribute(attr)?;
            if teams.contains(&team) {
                tracing::warn!(attr = %attr, "Attribute listed twice, mounting once");
                continue;
            }
            teams.push(team);
        }

        let refresh_interval = config.refresh_interval();
        if refresh_interval.is_zero() {
            return Err(PanelError::ZeroInterval);
        }

        let panels = teams
            .into_iter()
            .map(|team| {
                let store = PanelStore::new(team);
                let subscription = Subscription::new();
                let poller = Poller::new(
                    team.attribute(),
                    config.last_n,
                    Arc::clone(&source),
                    store.clone(),
                );
                let task = poller.start(subscription.clone(), refresh_interval);

                tracing::info!(attr = %team, title = team.title(), "Panel mounted");
                MountedPanel {
                    store,
                    subscription,
                    task,
                }
            })
            .collect();

        Ok(Self {
            panels,
            refresh_interval,
        })
    }

    /// Stop every poller and discard results still in flight. Idempotent.
    pub fn unmount(&self) {
        for panel in &self.panels {
            if panel.subscription.is_active() {
                tracing::info!(attr = %panel.store.team(), "Panel unmounted");
            }
            panel.unmount();
        }
    }

    /// Whether any panel is still mounted
    pub fn is_mounted(&self) -> bool {
        self.panels.iter().any(|p| p.subscription.is_active())
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Teams in page order
    pub fn teams(&self) -> Vec<Team> {
        self.panels.iter().map(|p| p.store.team()).collect()
    }

    /// Store behind a team's panel, if mounted
    pub fn store(&self, team: Team) -> Option<&PanelStore> {
        self.panels
            .iter()
            .map(|p| &p.store)
            .find(|store| store.team() == team)
    }

    /// Current view of every panel, in page order
    pub async fn views(&self) -> Vec<(Team, PanelView)> {
        let mut views = Vec::with_capacity(self.panels.len());
        for panel in &self.panels {
            views.push((panel.store.team(), panel.store.view().await));
        }
        views
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sth::{FetchResult, HistoryEnvelope};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HistorySource for CountingSource {
        async fn fetch_last_n(&self, attr: &str, _last_n: usize) -> FetchResult<HistoryEnvelope> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_value(json!({
                "contextResponses": [{ "contextElement": { "attributes": [
                    { "name": attr, "values": [{ "recvTime": "2024-01-01T10:00:00Z", "attrValue": 2 }] }
                ] } }]
            }))
            .unwrap())
        }
    }

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mount_rejects_unknown_attribute() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let result = Dashboard::mount(&attrs(&["gb", "xx"]), &SthConfig::default(), source.clone());

        assert!(matches!(result, Err(PanelError::UnsupportedAttribute(ref a)) if a == "xx"));
        tokio::task::yield_now().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mount_rejects_zero_interval() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let config = SthConfig {
            refresh_interval_ms: 0,
            ..SthConfig::default()
        };
        let result = Dashboard::mount(&attrs(&["gb"]), &config, source.clone());

        assert!(matches!(result, Err(PanelError::ZeroInterval)));
        tokio::task::yield_now().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_polls_each_panel_until_unmounted() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let dashboard =
            Dashboard::mount(&attrs(&["gr", "gb", "gr"]), &SthConfig::default(), source.clone())
                .unwrap();

        assert_eq!(dashboard.teams(), vec![Team::Red, Team::Blue]);
        assert_eq!(dashboard.refresh_interval(), Duration::from_millis(5000));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        let views = dashboard.views().await;
        assert_eq!(views.len(), 2);
        assert!(views
            .iter()
            .all(|(_, view)| matches!(view, PanelView::Populated { series } if series.len() == 1)));

        dashboard.unmount();
        assert!(!dashboard.is_mounted());
        dashboard.unmount();

        tokio::time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_store_lookup() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let dashboard = Dashboard::mount(&attrs(&["gb"]), &SthConfig::default(), source).unwrap();

        assert!(dashboard.store(Team::Blue).is_some());
        assert!(dashboard.store(Team::Red).is_none());
    }
}
