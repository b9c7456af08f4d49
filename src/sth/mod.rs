//! STH-Comet History API
//!
//! Client side of the context-history collaborator the dashboard polls.
//!
//! - **Client**: reqwest client issuing `GET <endpoint>?attr=<name>&lastN=<n>`
//! - **Envelope**: serde model of the nested `contextResponses` response
//! - **Errors**: transport, status and decode failures of a single fetch

mod client;
mod envelope;
mod error;

pub use client::{HistorySource, StHistoryClient};
pub use envelope::{AttributeHistory, ContextElement, ContextResponse, HistoryEnvelope, HistoryValue};
pub use error::{FetchError, FetchResult};
