//! Transaction messages and their outcome, as delivered by the ledger.

use serde::{Deserialize, Serialize};

use crate::attributes::Event;
use crate::types::{
    DataSourceId, OracleScriptId, ProposalContent, ProposalId, RawReport, RequestId, VoteOption,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSubmitProposal {
    pub proposer: String,
    pub content: ProposalContent,
    /// Coin string, e.g. `"100uband"`.
    pub initial_deposit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDeposit {
    pub proposal_id: ProposalId,
    pub depositor: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVote {
    pub proposal_id: ProposalId,
    pub voter: String,
    pub option: VoteOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRequestData {
    pub oracle_script_id: OracleScriptId,
    #[serde(default)]
    pub calldata: Vec<u8>,
    pub ask_count: u64,
    pub min_count: u64,
    #[serde(default)]
    pub client_id: String,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgReportData {
    pub request_id: RequestId,
    pub raw_reports: Vec<RawReport>,
    pub validator: String,
    pub reporter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateDataSource {
    pub name: String,
    pub owner: String,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEditDataSource {
    pub data_source_id: DataSourceId,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateOracleScript {
    pub name: String,
    pub owner: String,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEditOracleScript {
    pub oracle_script_id: OracleScriptId,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgActivate {
    pub validator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddReporter {
    pub validator: String,
    pub reporter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRemoveReporter {
    pub validator: String,
    pub reporter: String,
}

/// A message inside an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Msg {
    SubmitProposal(MsgSubmitProposal),
    Deposit(MsgDeposit),
    Vote(MsgVote),
    RequestData(MsgRequestData),
    ReportData(MsgReportData),
    CreateDataSource(MsgCreateDataSource),
    EditDataSource(MsgEditDataSource),
    CreateOracleScript(MsgCreateOracleScript),
    EditOracleScript(MsgEditOracleScript),
    Activate(MsgActivate),
    AddReporter(MsgAddReporter),
    RemoveReporter(MsgRemoveReporter),
    /// Any message this projector does not handle (bank sends, staking, ...).
    Other { type_url: String },
}

/// Discriminant of [`Msg`], used as the handler table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgKind {
    SubmitProposal,
    Deposit,
    Vote,
    RequestData,
    ReportData,
    CreateDataSource,
    EditDataSource,
    CreateOracleScript,
    EditOracleScript,
    Activate,
    AddReporter,
    RemoveReporter,
    Other,
}

impl Msg {
    pub fn kind(&self) -> MsgKind {
        match self {
            Self::SubmitProposal(_) => MsgKind::SubmitProposal,
            Self::Deposit(_) => MsgKind::Deposit,
            Self::Vote(_) => MsgKind::Vote,
            Self::RequestData(_) => MsgKind::RequestData,
            Self::ReportData(_) => MsgKind::ReportData,
            Self::CreateDataSource(_) => MsgKind::CreateDataSource,
            Self::EditDataSource(_) => MsgKind::EditDataSource,
            Self::CreateOracleScript(_) => MsgKind::CreateOracleScript,
            Self::EditOracleScript(_) => MsgKind::EditOracleScript,
            Self::Activate(_) => MsgKind::Activate,
            Self::AddReporter(_) => MsgKind::AddReporter,
            Self::RemoveReporter(_) => MsgKind::RemoveReporter,
            Self::Other { .. } => MsgKind::Other,
        }
    }
}

impl std::fmt::Display for MsgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SubmitProposal => "submit_proposal",
            Self::Deposit => "deposit",
            Self::Vote => "vote",
            Self::RequestData => "request_data",
            Self::ReportData => "report_data",
            Self::CreateDataSource => "create_data_source",
            Self::EditDataSource => "edit_data_source",
            Self::CreateOracleScript => "create_oracle_script",
            Self::EditOracleScript => "edit_oracle_script",
            Self::Activate => "activate",
            Self::AddReporter => "add_reporter",
            Self::RemoveReporter => "remove_reporter",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// An executed transaction: its messages and every event emitted while running them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    #[serde(with = "hex_bytes")]
    pub hash: Vec<u8>,
    /// Failed transactions left no state behind and are not projected.
    #[serde(default = "bool_true")]
    pub success: bool,
    pub msgs: Vec<Msg>,
    #[serde(default)]
    pub events: Vec<Event>,
}

fn bool_true() -> bool {
    true
}

impl TxOutcome {
    /// Transaction hash as carried in `tx_hash` payload fields.
    pub fn hash_hex(&self) -> String {
        hex::encode_upper(&self.hash)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
