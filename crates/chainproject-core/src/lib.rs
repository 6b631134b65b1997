//! chainproject-core — deterministic projection of ledger outcomes into an
//! ordered record stream for external indexes.
//!
//! # Architecture
//!
//! ```text
//! Projector
//!     ├── AttributeIndex   (per-tx event attribute correlation)
//!     ├── HandlerTable     (message / end-block event → handler)
//!     ├── StateReader      (post-execution ledger state, read-only)
//!     ├── Emitter          (per-entity record builders)
//!     ├── bootstrap        (full-state resync)
//!     └── ProjectionSink   (ordered, fire-and-forget output)
//! ```

pub mod attributes;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod msg;
pub mod projector;
pub mod records;
pub mod sink;
pub mod state;
pub mod types;

pub use attributes::{AttributeIndex, Event};
pub use bootstrap::BootstrapStats;
pub use config::{ProjectorBuilder, ProjectorConfig};
pub use error::ProjectionError;
pub use handlers::{HandlerTable, MsgExtra};
pub use msg::{Msg, MsgKind, TxOutcome};
pub use projector::{BlockStats, Projector};
pub use records::Emitter;
pub use sink::{ChannelSink, ProjectionSink, Record, RecordKind, RecordSemantics};
pub use state::{MemoryState, StateReader};
pub use types::BlockInfo;
