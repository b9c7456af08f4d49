//! STH-Comet REST API Client
//!
//! HTTP client for the context-history endpoint queried by the dashboard.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

use super::envelope::HistoryEnvelope;
use super::error::{FetchError, FetchResult};
use crate::config::SthConfig;

/// Anything that can return the last N samples of an attribute
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch the history envelope holding the last `last_n` samples of `attr`
    async fn fetch_last_n(&self, attr: &str, last_n: usize) -> FetchResult<HistoryEnvelope>;
}

/// History API client backed by reqwest
pub struct StHistoryClient {
    client: Client,
    endpoint: String,
}

impl StHistoryClient {
    /// Create a new client for the configured endpoint
    pub fn new(config: &SthConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Full request URL for an attribute, as it appears in the logs
    pub fn request_url(&self, attr: &str, last_n: usize) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}attr={}&lastN={}", self.endpoint, separator, attr, last_n)
    }
}

#[async_trait]
impl HistorySource for StHistoryClient {
    async fn fetch_last_n(&self, attr: &str, last_n: usize) -> FetchResult<HistoryEnvelope> {
        tracing::debug!(attr, url = %self.request_url(attr, last_n), "Fetching attribute history");

        let last_n = last_n.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("attr", attr), ("lastN", last_n.as_str())])
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(FetchError::from_transport)?;
        HistoryEnvelope::from_slice(&body)
    }
}
