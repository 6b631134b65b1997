//! Ledger entities observed by the projector.
//!
//! These are read from ledger state, never owned or mutated here. IDs are
//! assigned by the ledger state machine (monotonic, 1-based).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type DataSourceId = u64;
pub type OracleScriptId = u64;
pub type RequestId = u64;
pub type ProposalId = u64;
pub type ExternalId = u64;

const NANOS_PER_SEC: i64 = 1_000_000_000;
const SECS_PER_DAY: i64 = 86_400;

/// Unix timestamp in nanoseconds, the unit used on the wire for block-derived times.
///
/// Times outside the nanosecond range (before 1677 or after 2262) map to `0`,
/// the "unset" value. The ledger stores unset proposal times as
/// `0001-01-01T00:00:00Z`.
pub fn unix_nanos(time: &DateTime<Utc>) -> i64 {
    time.timestamp_nanos_opt().unwrap_or(0)
}

/// Start of the UTC day containing `time`, in unix nanoseconds; `0` when out of range.
pub fn day_bucket(time: &DateTime<Utc>) -> i64 {
    let secs = time.timestamp();
    (secs - secs.rem_euclid(SECS_PER_DAY))
        .checked_mul(NANOS_PER_SEC)
        .unwrap_or(0)
}

// ─── BlockInfo ────────────────────────────────────────────────────────────────

/// The block currently being projected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block height.
    pub height: u64,
    /// Block time as agreed by consensus.
    pub time: DateTime<Utc>,
    /// Block hash (hex).
    #[serde(default)]
    pub hash: String,
}

// ─── Oracle entities ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub owner: String,
    pub name: String,
    pub description: String,
    /// Reference to the executable in the ledger's file store.
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleScript {
    pub owner: String,
    pub name: String,
    pub description: String,
    /// Reference to the compiled code; also its code hash.
    pub filename: String,
    pub schema: String,
    pub source_code_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    pub external_id: ExternalId,
    pub data_source_id: DataSourceId,
    #[serde(default)]
    pub calldata: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub oracle_script_id: OracleScriptId,
    #[serde(default)]
    pub calldata: Vec<u8>,
    /// Validators chosen to answer; its length is the ask count.
    pub requested_validators: Vec<String>,
    pub min_count: u64,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub request_height: u64,
    #[serde(default)]
    pub request_time: i64,
    pub raw_requests: Vec<RawRequest>,
}

impl Request {
    pub fn ask_count(&self) -> u64 {
        self.requested_validators.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReport {
    pub external_id: ExternalId,
    pub exit_code: u32,
    #[serde(default)]
    pub data: Vec<u8>,
}

/// A validator's answer to a request, as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub validator: String,
    pub raw_reports: Vec<RawReport>,
}

/// Terminal classification of a data request.
///
/// Ordered so that `Open` sorts before every terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResolveStatus {
    Open,
    Success,
    Failure,
    Expired,
}

impl ResolveStatus {
    /// Wire code.
    pub fn code(self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Success => 1,
            Self::Failure => 2,
            Self::Expired => 3,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Open),
            1 => Some(Self::Success),
            2 => Some(Self::Failure),
            3 => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Open
    }

    /// Open moves to any terminal status; terminal statuses never move.
    pub fn can_transition_to(self, next: ResolveStatus) -> bool {
        self == next || (self == Self::Open && next.is_terminal())
    }
}

/// Outcome of a resolved request. Produced exactly once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResult {
    #[serde(default)]
    pub client_id: String,
    /// Unix seconds.
    pub request_time: i64,
    /// Unix seconds.
    pub resolve_time: i64,
    pub resolve_status: ResolveStatus,
    #[serde(default)]
    pub ans_count: u64,
    #[serde(default)]
    pub result: Vec<u8>,
}

// ─── Governance ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Nil,
    DepositPeriod,
    VotingPeriod,
    Passed,
    Rejected,
    Failed,
}

impl ProposalStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Nil => 0,
            Self::DepositPeriod => 1,
            Self::VotingPeriod => 2,
            Self::Passed => 3,
            Self::Rejected => 4,
            Self::Failed => 5,
        }
    }
}

/// Human-facing content of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalContent {
    /// Proposal type, e.g. `"Text"` or `"ParameterChange"`.
    pub proposal_type: String,
    pub title: String,
    pub description: String,
    pub proposal_route: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: String,
    pub content: ProposalContent,
    pub status: ProposalStatus,
    pub submit_time: DateTime<Utc>,
    pub deposit_end_time: DateTime<Utc>,
    /// Coin string, e.g. `"100uband"`.
    pub total_deposit: String,
    pub voting_start_time: DateTime<Utc>,
    pub voting_end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub proposal_id: ProposalId,
    pub depositor: String,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOption {
    Empty,
    Yes,
    Abstain,
    No,
    NoWithVeto,
}

impl VoteOption {
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Yes => 1,
            Self::Abstain => 2,
            Self::No => 3,
            Self::NoWithVeto => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: String,
    pub option: VoteOption,
}

// ─── Validators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    pub moniker: String,
}

/// Oracle activity of a validator. Defaults to inactive since the unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorStatus {
    pub is_active: bool,
    pub since: DateTime<Utc>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
