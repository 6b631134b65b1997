//! Projection Sink — the ordered, append-only output of the projector.
//!
//! Writes are fire-and-forget: the projector never retries or rolls back,
//! and a write must return immediately. Delivery guarantees belong to
//! whatever sits behind the sink.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// Record payload: field name → JSON value.
pub type Payload = Map<String, Value>;

/// How a downstream index must apply a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSemantics {
    /// `NEW_*`: a fact inserted exactly once.
    Insert,
    /// `SET_*` / `UPDATE_*` snapshots: create-or-replace by key, re-appliable.
    Upsert,
    /// Time-series entries: every record adds a row, even under an equal key.
    Append,
    /// Aggregate counters: add one to the keyed counter.
    Increment,
    /// Delete by key.
    Remove,
}

/// Every record kind on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    NewProposal,
    UpdateProposal,
    SetDeposit,
    SetVote,
    NewRequest,
    NewRawRequest,
    NewValRequest,
    NewReport,
    NewRawReport,
    UpdateRequest,
    SetDataSource,
    SetOracleScript,
    SetReporter,
    RemoveReporter,
    UpdateValidatorStatus,
    SetHistoricalValidatorStatus,
    NewDataSourceRequest,
    NewOracleScriptRequest,
    UpdateDataSourceRequest,
    UpdateOracleScriptRequest,
    UpdateRelatedDsOs,
    SetRequestCountPerDay,
}

impl RecordKind {
    /// The wire tag, e.g. `"NEW_REQUEST"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewProposal => "NEW_PROPOSAL",
            Self::UpdateProposal => "UPDATE_PROPOSAL",
            Self::SetDeposit => "SET_DEPOSIT",
            Self::SetVote => "SET_VOTE",
            Self::NewRequest => "NEW_REQUEST",
            Self::NewRawRequest => "NEW_RAW_REQUEST",
            Self::NewValRequest => "NEW_VAL_REQUEST",
            Self::NewReport => "NEW_REPORT",
            Self::NewRawReport => "NEW_RAW_REPORT",
            Self::UpdateRequest => "UPDATE_REQUEST",
            Self::SetDataSource => "SET_DATA_SOURCE",
            Self::SetOracleScript => "SET_ORACLE_SCRIPT",
            Self::SetReporter => "SET_REPORTER",
            Self::RemoveReporter => "REMOVE_REPORTER",
            Self::UpdateValidatorStatus => "UPDATE_VALIDATOR_STATUS",
            Self::SetHistoricalValidatorStatus => "SET_HISTORICAL_VALIDATOR_STATUS",
            Self::NewDataSourceRequest => "NEW_DATA_SOURCE_REQUEST",
            Self::NewOracleScriptRequest => "NEW_ORACLE_SCRIPT_REQUEST",
            Self::UpdateDataSourceRequest => "UPDATE_DATA_SOURCE_REQUEST",
            Self::UpdateOracleScriptRequest => "UPDATE_ORACLE_SCRIPT_REQUEST",
            Self::UpdateRelatedDsOs => "UPDATE_RELATED_DS_OS",
            Self::SetRequestCountPerDay => "SET_REQUEST_COUNT_PER_DAY",
        }
    }

    pub fn semantics(self) -> RecordSemantics {
        match self {
            Self::NewProposal
            | Self::NewRequest
            | Self::NewRawRequest
            | Self::NewValRequest
            | Self::NewReport
            | Self::NewRawReport => RecordSemantics::Insert,
            // Counter initialisation is an upsert of zero; later bumps increment.
            Self::NewDataSourceRequest | Self::NewOracleScriptRequest => RecordSemantics::Upsert,
            Self::UpdateDataSourceRequest
            | Self::UpdateOracleScriptRequest
            | Self::UpdateRelatedDsOs
            | Self::SetRequestCountPerDay => RecordSemantics::Increment,
            Self::SetHistoricalValidatorStatus => RecordSemantics::Append,
            Self::RemoveReporter => RecordSemantics::Remove,
            _ => RecordSemantics::Upsert,
        }
    }

    /// Downstream table the record lands in. `NEW_*` and `UPDATE_*` of the
    /// same entity share a table so updates merge into the inserted row.
    pub fn table(self) -> &'static str {
        match self {
            Self::NewProposal | Self::UpdateProposal => "proposals",
            Self::SetDeposit => "deposits",
            Self::SetVote => "votes",
            Self::NewRequest | Self::UpdateRequest => "requests",
            Self::NewRawRequest => "raw_requests",
            Self::NewValRequest => "val_requests",
            Self::NewReport => "reports",
            Self::NewRawReport => "raw_reports",
            Self::SetDataSource => "data_sources",
            Self::SetOracleScript => "oracle_scripts",
            Self::SetReporter | Self::RemoveReporter => "reporters",
            Self::UpdateValidatorStatus => "validator_statuses",
            Self::SetHistoricalValidatorStatus => "historical_validator_statuses",
            Self::NewDataSourceRequest | Self::UpdateDataSourceRequest => "data_source_requests",
            Self::NewOracleScriptRequest | Self::UpdateOracleScriptRequest => {
                "oracle_script_requests"
            }
            Self::UpdateRelatedDsOs => "related_data_source_oracle_scripts",
            Self::SetRequestCountPerDay => "request_count_per_days",
        }
    }

    /// Payload fields that identify the row this record applies to.
    pub fn key_fields(self) -> &'static [&'static str] {
        match self {
            Self::NewProposal | Self::UpdateProposal => &["id"],
            Self::SetDeposit => &["proposal_id", "depositor"],
            Self::SetVote => &["proposal_id", "voter"],
            Self::NewRequest | Self::UpdateRequest => &["id"],
            Self::NewRawRequest => &["request_id", "external_id"],
            Self::NewValRequest => &["request_id", "validator"],
            Self::NewReport => &["request_id", "validator"],
            Self::NewRawReport => &["request_id", "validator", "external_id"],
            Self::SetDataSource | Self::SetOracleScript => &["id"],
            Self::SetReporter | Self::RemoveReporter => &["reporter", "validator"],
            Self::UpdateValidatorStatus => &["validator"],
            Self::SetHistoricalValidatorStatus => &["operator_address", "timestamp"],
            Self::NewDataSourceRequest | Self::UpdateDataSourceRequest => &["data_source_id"],
            Self::NewOracleScriptRequest | Self::UpdateOracleScriptRequest => {
                &["oracle_script_id"]
            }
            Self::UpdateRelatedDsOs => &["data_source_id", "oracle_script_id"],
            Self::SetRequestCountPerDay => &["date"],
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed record handed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: RecordKind,
    pub payload: Payload,
}

impl Record {
    /// Build a record from a `serde_json::json!({...})` object literal.
    ///
    /// Non-object values produce an empty payload.
    pub fn new(kind: RecordKind, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { kind, payload }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Row key built from [`RecordKind::key_fields`], e.g. `"7"` or `"3|band1x"`.
    pub fn key(&self) -> String {
        self.kind
            .key_fields()
            .iter()
            .map(|field| match self.payload.get(*field) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Ordered, append-only, non-blocking record output.
pub trait ProjectionSink {
    fn write(&mut self, record: Record);
}

impl ProjectionSink for Vec<Record> {
    fn write(&mut self, record: Record) {
        self.push(record);
    }
}

/// Forwards records over an unbounded tokio channel.
///
/// `send` never blocks; buffering and backpressure are the receiver's concern.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Record>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Record>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Record>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProjectionSink for ChannelSink {
    fn write(&mut self, record: Record) {
        if let Err(e) = self.tx.send(record) {
            tracing::warn!(kind = %e.0.kind, "Projection sink receiver dropped; record discarded");
        }
    }
}
