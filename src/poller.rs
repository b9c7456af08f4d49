//! Attribute Poller
//!
//! Periodically fetches the last N samples of one attribute and publishes
//! them to a panel store.
//!
//! A poll cycle is fetch → parse → publish. Failures are logged and leave the
//! previous series in place; the next tick is the only retry. Every write to
//! the store is guarded by the panel's [`Subscription`], checked right before
//! the write, so a result that resolves after teardown is dropped.

use std::sync::Arc;
use std::time::Duration;

use crate::lifecycle::{schedule, Subscription, TaskHandle};
use crate::panel::PanelStore;
use crate::series::AttributeSeries;
use crate::sth::{FetchResult, HistorySource};

/// Default number of samples requested per cycle
pub const DEFAULT_LAST_N: usize = 20;

/// Default time between cycles
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Outcome of a single poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new series was published
    Published { samples: usize },
    /// Fetch succeeded but the subscription was disposed in the meantime
    Discarded,
    /// Fetch or parse failed; the previous series was kept
    Failed,
}

/// Polls one attribute into one panel store
pub struct Poller {
    attribute: String,
    last_n: usize,
    source: Arc<dyn HistorySource>,
    store: PanelStore,
}

impl Poller {
    pub fn new(
        attribute: impl Into<String>,
        last_n: usize,
        source: Arc<dyn HistorySource>,
        store: PanelStore,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            last_n,
            source,
            store,
        }
    }

    /// Run one fetch-parse-publish cycle
    pub async fn poll_once(&self, subscription: &Subscription) -> CycleOutcome {
        if subscription.is_active() {
            self.store.set_loading(true).await;
        }

        let outcome = match self.fetch_series().await {
            Ok(series) => {
                if subscription.is_active() {
                    let samples = series.len();
                    self.store.publish(series).await;
                    tracing::debug!(attr = %self.attribute, samples, "Published attribute series");
                    CycleOutcome::Published { samples }
                } else {
                    tracing::debug!(attr = %self.attribute, "Panel unmounted, discarding result");
                    CycleOutcome::Discarded
                }
            }
            Err(e) => {
                tracing::warn!(attr = %self.attribute, error = %e, "History fetch failed");
                CycleOutcome::Failed
            }
        };

        if subscription.is_active() {
            self.store.set_loading(false).await;
        }

        outcome
    }

    async fn fetch_series(&self) -> FetchResult<AttributeSeries> {
        let envelope = self
            .source
            .fetch_last_n(&self.attribute, self.last_n)
            .await?;
        let values = envelope.attribute_values(&self.attribute)?;

        Ok(AttributeSeries::from_values(&self.attribute, &values))
    }

    /// Start polling now and then every `interval`.
    ///
    /// Cancelling the returned handle stops future cycles; cycles already in
    /// flight finish but publish nothing once `subscription` is disposed.
    pub fn start(self, subscription: Subscription, interval: Duration) -> TaskHandle {
        tracing::info!(
            attr = %self.attribute,
            last_n = self.last_n,
            interval_ms = interval.as_millis() as u64,
            "Starting attribute poller"
        );

        let poller = Arc::new(self);
        schedule(interval, move || {
            let poller = Arc::clone(&poller);
            let subscription = subscription.clone();
            async move {
                poller.poll_once(&subscription).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelView, Team};
    use crate::sth::{FetchError, HistoryEnvelope};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn envelope(attr: &str, values: Value) -> HistoryEnvelope {
        serde_json::from_value(json!({
            "contextResponses": [{ "contextElement": { "attributes": [
                { "name": attr, "values": values }
            ] } }]
        }))
        .unwrap()
    }

    enum Reply {
        Envelope(HistoryEnvelope),
        Status(u16),
        Garbage,
    }

    /// Replies in order, repeating the last one
    struct ScriptedSource {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
        requested: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HistorySource for ScriptedSource {
        async fn fetch_last_n(&self, attr: &str, last_n: usize) -> FetchResult<HistoryEnvelope> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push((attr.to_string(), last_n));

            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                match replies.front().unwrap() {
                    Reply::Envelope(env) => Reply::Envelope(env.clone()),
                    Reply::Status(code) => Reply::Status(*code),
                    Reply::Garbage => Reply::Garbage,
                }
            };

            match reply {
                Reply::Envelope(env) => Ok(env),
                Reply::Status(status) => Err(FetchError::Status {
                    status,
                    body: String::new(),
                }),
                Reply::Garbage => Err(HistoryEnvelope::from_slice(b"oops").unwrap_err()),
            }
        }
    }

    /// Blocks every fetch until released
    struct GatedSource {
        gate: Notify,
        reply: HistoryEnvelope,
    }

    #[async_trait]
    impl HistorySource for GatedSource {
        async fn fetch_last_n(&self, _attr: &str, _last_n: usize) -> FetchResult<HistoryEnvelope> {
            self.gate.notified().await;
            Ok(self.reply.clone())
        }
    }

    fn poller_with(source: Arc<dyn HistorySource>, team: Team) -> (Poller, PanelStore) {
        let store = PanelStore::new(team);
        let poller = Poller::new(team.attribute(), DEFAULT_LAST_N, source, store.clone());
        (poller, store)
    }

    #[tokio::test]
    async fn test_poll_publishes_and_drops_nan() {
        let source = ScriptedSource::new(vec![Reply::Envelope(envelope(
            "gb",
            json!([
                { "recvTime": "2024-01-01T10:00:00Z", "attrValue": 3 },
                { "recvTime": "", "attrValue": "bad" }
            ]),
        ))]);
        let (poller, store) = poller_with(source.clone(), Team::Blue);
        let sub = Subscription::new();

        let outcome = poller.poll_once(&sub).await;
        assert_eq!(outcome, CycleOutcome::Published { samples: 1 });

        let state = store.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.series.len(), 1);
        let sample = &state.series.samples()[0];
        assert_eq!(sample.timestamp, "2024-01-01T10:00:00Z");
        assert_eq!(sample.value, 3.0);
        assert!(!sample.display_time.is_empty());

        assert_eq!(
            source.requested.lock().unwrap().as_slice(),
            &[("gb".to_string(), DEFAULT_LAST_N)]
        );
    }

    #[tokio::test]
    async fn test_error_status_keeps_previous_series() {
        let source = ScriptedSource::new(vec![
            Reply::Envelope(envelope("gr", json!([{ "recvTime": "2024-01-01T10:00:00Z", "attrValue": 2 }]))),
            Reply::Status(500),
        ]);
        let (poller, store) = poller_with(source, Team::Red);
        let sub = Subscription::new();

        assert_eq!(poller.poll_once(&sub).await, CycleOutcome::Published { samples: 1 });
        assert_eq!(poller.poll_once(&sub).await, CycleOutcome::Failed);

        let state = store.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.series.len(), 1);
        assert_eq!(state.series.samples()[0].value, 2.0);
    }

    #[tokio::test]
    async fn test_malformed_body_keeps_previous_series() {
        let source = ScriptedSource::new(vec![
            Reply::Envelope(envelope("gb", json!([{ "recvTime": "2024-01-01T10:00:00Z", "attrValue": 1 }]))),
            Reply::Garbage,
            Reply::Envelope(serde_json::from_value(json!({ "contextResponses": [] })).unwrap()),
        ]);
        let (poller, store) = poller_with(source, Team::Blue);
        let sub = Subscription::new();

        poller.poll_once(&sub).await;
        assert_eq!(poller.poll_once(&sub).await, CycleOutcome::Failed);
        assert_eq!(poller.poll_once(&sub).await, CycleOutcome::Failed);
        assert_eq!(store.snapshot().await.series.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_values_shows_empty_state() {
        let source = ScriptedSource::new(vec![Reply::Envelope(envelope("gb", json!([])))]);
        let (poller, store) = poller_with(source, Team::Blue);

        assert_eq!(
            poller.poll_once(&Subscription::new()).await,
            CycleOutcome::Published { samples: 0 }
        );
        assert!(store.snapshot().await.series.is_empty());
        assert_eq!(store.view().await, PanelView::Empty);
    }

    #[tokio::test]
    async fn test_teardown_during_fetch_discards_result() {
        let source = Arc::new(GatedSource {
            gate: Notify::new(),
            reply: envelope("gb", json!([{ "recvTime": "2024-01-01T10:00:00Z", "attrValue": 7 }])),
        });
        let (poller, store) = poller_with(source.clone(), Team::Blue);
        let sub = Subscription::new();

        let cycle = {
            let sub = sub.clone();
            tokio::spawn(async move { poller.poll_once(&sub).await })
        };

        while !store.snapshot().await.loading {
            tokio::task::yield_now().await;
        }

        sub.dispose();
        source.gate.notify_one();

        assert_eq!(cycle.await.unwrap(), CycleOutcome::Discarded);
        let state = store.snapshot().await;
        assert!(state.series.is_empty());
        assert!(state.updated_at.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_polls_on_interval_until_cancelled() {
        let source = ScriptedSource::new(vec![Reply::Envelope(envelope(
            "gr",
            json!([{ "recvTime": "2024-01-01T10:00:00Z", "attrValue": 1 }]),
        ))]);
        let (poller, store) = poller_with(source.clone(), Team::Red);
        let sub = Subscription::new();

        let handle = poller.start(sub.clone(), Duration::from_millis(5000));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot().await.series.len(), 1);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        sub.dispose();
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }
}
