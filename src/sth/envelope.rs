//! STH-Comet response envelope
//!
//! The history API wraps the samples several levels deep:
//!
//! ```text
//! { "contextResponses": [ { "contextElement": { "attributes": [
//!       { "name": "gb", "values": [ { "recvTime": "...", "attrValue": 3 } ] }
//! ] } } ] }
//! ```
//!
//! Sample readings stay as raw [`serde_json::Value`]s here; numeric coercion
//! happens when they are mapped into a series.

use serde::Deserialize;
use serde_json::Value;

use super::error::{FetchError, FetchResult};

/// Top-level history response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEnvelope {
    #[serde(default)]
    pub context_responses: Option<Vec<ContextResponse>>,
}

/// One entry of `contextResponses`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResponse {
    #[serde(default)]
    pub context_element: Option<ContextElement>,
}

/// Entity whose attribute history was requested
#[derive(Debug, Clone, Deserialize)]
pub struct ContextElement {
    #[serde(default)]
    pub attributes: Option<Vec<AttributeHistory>>,
}

/// History of a single attribute.
///
/// Kept as raw JSON so that a malformed sibling attribute does not fail the
/// whole response; only the requested attribute is interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeHistory {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub values: Value,
}

/// One raw sample as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryValue {
    #[serde(default)]
    pub recv_time: Value,
    #[serde(default)]
    pub attr_value: Value,
    #[serde(default)]
    pub value: Value,
}

impl HistoryEnvelope {
    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> FetchResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Values recorded for `attr` in the first context element.
    ///
    /// A missing `contextResponses[0].contextElement.attributes` chain is a
    /// shape error. An attribute that is absent, or whose `values` is not an
    /// array, simply has no samples yet.
    pub fn attribute_values(&self, attr: &str) -> FetchResult<Vec<HistoryValue>> {
        let response = self
            .context_responses
            .as_ref()
            .ok_or_else(|| FetchError::Shape("missing contextResponses".to_string()))?
            .first()
            .ok_or_else(|| FetchError::Shape("contextResponses is empty".to_string()))?;

        let attributes = response
            .context_element
            .as_ref()
            .ok_or_else(|| FetchError::Shape("missing contextElement".to_string()))?
            .attributes
            .as_ref()
            .ok_or_else(|| FetchError::Shape("missing contextElement.attributes".to_string()))?;

        let values = match attributes.iter().find(|a| a.name.as_str() == Some(attr)) {
            Some(AttributeHistory {
                values: Value::Array(items),
                ..
            }) => items.iter().map(HistoryValue::from_raw).collect(),
            _ => Vec::new(),
        };

        Ok(values)
    }
}

impl HistoryValue {
    /// Read one entry of a `values` array; anything but an object has no fields
    pub fn from_raw(raw: &Value) -> Self {
        Self::deserialize(raw).unwrap_or_default()
    }

    /// Raw reading: `attrValue`, falling back to `value` when absent or null
    pub fn reading(&self) -> &Value {
        if self.attr_value.is_null() {
            &self.value
        } else {
            &self.attr_value
        }
    }
}
