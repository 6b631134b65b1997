//! Attribute Index — per-transaction correlation of emitted event attributes.
//!
//! The ledger emits events as `(type, [(key, value)])`. Identifiers generated
//! during execution (a new request id, a new proposal id) are only visible
//! here, so handlers look them up positionally: the i-th message of a kind
//! consumes the i-th value of its correlated attribute.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// Event types and attribute keys the handlers correlate on.
pub mod keys {
    pub const EVENT_REQUEST: &str = "request";
    pub const EVENT_RESOLVE: &str = "resolve";
    pub const EVENT_CREATE_DATA_SOURCE: &str = "create_data_source";
    pub const EVENT_CREATE_ORACLE_SCRIPT: &str = "create_oracle_script";
    pub const EVENT_DEACTIVATE: &str = "deactivate";
    pub const EVENT_SUBMIT_PROPOSAL: &str = "submit_proposal";
    pub const EVENT_ACTIVE_PROPOSAL: &str = "active_proposal";

    pub const ATTR_ID: &str = "id";
    pub const ATTR_VALIDATOR: &str = "validator";
    pub const ATTR_PROPOSAL_ID: &str = "proposal_id";
}

/// A single `(key, value)` event attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// A typed ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Event {
    pub fn new<K, V>(kind: impl Into<String>, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind: kind.into(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| Attribute {
                    key: key.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }
}

/// Ordered attribute values keyed by event type, then attribute key.
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    values: HashMap<String, HashMap<String, Vec<String>>>,
}

impl AttributeIndex {
    /// Build the index from events in emission order.
    pub fn build(events: &[Event]) -> Self {
        let mut values: HashMap<String, HashMap<String, Vec<String>>> = HashMap::new();
        for event in events {
            let by_key = values.entry(event.kind.clone()).or_default();
            for attr in &event.attributes {
                by_key
                    .entry(attr.key.clone())
                    .or_default()
                    .push(attr.value.clone());
            }
        }
        Self { values }
    }

    /// All values of `event_type.key`, in emission order.
    pub fn values(&self, event_type: &str, key: &str) -> &[String] {
        self.values
            .get(event_type)
            .and_then(|by_key| by_key.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The value emitted by the `index`-th (0-based) occurrence of `event_type`.
    pub fn occurrence(
        &self,
        event_type: &str,
        key: &str,
        index: usize,
    ) -> Result<&str, ProjectionError> {
        let values = self.values(event_type, key);
        values
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| ProjectionError::Correlation {
                key: format!("{event_type}.{key}"),
                index,
                available: values.len(),
            })
    }

    /// Like [`occurrence`](Self::occurrence), parsed as a ledger id.
    pub fn occurrence_u64(
        &self,
        event_type: &str,
        key: &str,
        index: usize,
    ) -> Result<u64, ProjectionError> {
        let raw = self.occurrence(event_type, key, index)?;
        raw.parse()
            .map_err(|_| ProjectionError::MalformedAttribute {
                key: format!("{event_type}.{key}"),
                value: raw.to_string(),
            })
    }

    /// Returns `true` if no attributes were indexed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
