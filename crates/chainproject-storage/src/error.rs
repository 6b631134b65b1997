//! Errors raised while applying records to a downstream index.

use chainproject_core::RecordKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Duplicate {kind} record for key '{key}'")]
    Duplicate { kind: RecordKind, key: String },

    #[error("Resolve status of request '{key}' regressed from {from} to {to}")]
    StatusRegression { key: String, from: u64, to: u64 },

    #[error("Storage error: {0}")]
    Storage(String),
}
