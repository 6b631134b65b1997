//! Error types for the projection pipeline.

use thiserror::Error;

/// Errors that can occur while projecting ledger outcomes.
///
/// None of these are recoverable: the ledger is deterministic, so any of them
/// means the node's state and its event log have diverged. Callers halt.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invariant violation: {entity} {id} missing from ledger state")]
    MissingEntity { entity: &'static str, id: String },

    #[error("Attribute correlation error: '{key}' has {available} value(s), occurrence {index} requested")]
    Correlation {
        key: String,
        index: usize,
        available: usize,
    },

    #[error("Malformed attribute '{key}': {value:?}")]
    MalformedAttribute { key: String, value: String },

    #[error("Handler '{handler}' received a {got} message")]
    HandlerMismatch { handler: &'static str, got: String },

    #[error("{0}")]
    Other(String),
}

impl ProjectionError {
    /// Shorthand for [`ProjectionError::MissingEntity`].
    pub fn missing(entity: &'static str, id: impl ToString) -> Self {
        Self::MissingEntity {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns `true` if the event log disagrees with the messages that produced it.
    pub fn is_correlation(&self) -> bool {
        matches!(
            self,
            Self::Correlation { .. } | Self::MalformedAttribute { .. }
        )
    }

    /// Every projection error halts the node.
    pub fn is_fatal(&self) -> bool {
        true
    }
}
