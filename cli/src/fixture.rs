//! Input files for `bootstrap` and `replay`.

use chainproject_core::{BlockInfo, Event, MemoryState, TxOutcome};
use serde::Deserialize;

/// Ledger state at one block, for `bootstrap`.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub block: BlockInfo,
    pub state: MemoryState,
}

/// A sequence of executed blocks, for `replay`.
#[derive(Debug, Deserialize)]
pub struct History {
    pub blocks: Vec<ExecutedBlock>,
}

/// One block after execution: the state it left behind, its transactions,
/// and its end-block events.
#[derive(Debug, Deserialize)]
pub struct ExecutedBlock {
    pub block: BlockInfo,
    pub state: MemoryState,
    #[serde(default)]
    pub txs: Vec<TxOutcome>,
    #[serde(default)]
    pub end_block: Vec<Event>,
}
