//! State Reader — read-only access to post-execution, pre-commit ledger state.
//!
//! Handlers read authoritative values here instead of trusting message input.
//! The surrounding ledger execution freezes this state for the duration of
//! one block, so the projector never locks anything.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::types::{
    DataSource, DataSourceId, Deposit, OracleResult, OracleScript, OracleScriptId, Proposal,
    ProposalId, Report, Request, RequestId, Validator, ValidatorStatus, Vote,
};

/// Read-only accessors into the ledger's state machine.
///
/// The `must_*` helpers turn a missing entity into an invariant violation.
pub trait StateReader {
    fn data_source(&self, id: DataSourceId) -> Option<DataSource>;
    /// All data sources, in ascending id order starting at 1.
    fn data_sources(&self) -> Vec<DataSource>;
    fn oracle_script(&self, id: OracleScriptId) -> Option<OracleScript>;
    /// All oracle scripts, in ascending id order starting at 1.
    fn oracle_scripts(&self) -> Vec<OracleScript>;
    /// Content of a stored executable or code file; empty if unknown.
    fn file(&self, filename: &str) -> Vec<u8>;

    /// Number of requests ever created; ids run `1..=request_count`.
    fn request_count(&self) -> u64;
    fn request(&self, id: RequestId) -> Option<Request>;
    fn result(&self, id: RequestId) -> Option<OracleResult>;
    fn reports(&self, id: RequestId) -> Vec<Report>;

    fn proposal(&self, id: ProposalId) -> Option<Proposal>;
    fn proposals(&self) -> Vec<Proposal>;
    fn deposit(&self, id: ProposalId, depositor: &str) -> Option<Deposit>;
    fn deposits(&self, id: ProposalId) -> Vec<Deposit>;
    fn vote(&self, id: ProposalId, voter: &str) -> Option<Vote>;
    fn votes(&self, id: ProposalId) -> Vec<Vote>;

    fn validator(&self, operator_address: &str) -> Option<Validator>;
    fn validators(&self) -> Vec<Validator>;
    fn validator_status(&self, operator_address: &str) -> ValidatorStatus;
    /// Reporters currently delegated by `validator`.
    fn reporters(&self, validator: &str) -> Vec<String>;

    fn must_data_source(&self, id: DataSourceId) -> Result<DataSource, ProjectionError> {
        self.data_source(id)
            .ok_or_else(|| ProjectionError::missing("data source", id))
    }

    fn must_oracle_script(&self, id: OracleScriptId) -> Result<OracleScript, ProjectionError> {
        self.oracle_script(id)
            .ok_or_else(|| ProjectionError::missing("oracle script", id))
    }

    fn must_request(&self, id: RequestId) -> Result<Request, ProjectionError> {
        self.request(id)
            .ok_or_else(|| ProjectionError::missing("request", id))
    }

    fn must_result(&self, id: RequestId) -> Result<OracleResult, ProjectionError> {
        self.result(id)
            .ok_or_else(|| ProjectionError::missing("result", id))
    }

    fn must_proposal(&self, id: ProposalId) -> Result<Proposal, ProjectionError> {
        self.proposal(id)
            .ok_or_else(|| ProjectionError::missing("proposal", id))
    }
}

// ─── In-memory state (for testing) ────────────────────────────────────────────

/// In-memory ledger state for tests, fixtures, and offline bootstrap.
///
/// Mutators mimic what the ledger state machine does, including 1-based id
/// assignment; the projector itself only ever reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryState {
    #[serde(default)]
    data_sources: Vec<DataSource>,
    #[serde(default)]
    oracle_scripts: Vec<OracleScript>,
    #[serde(default)]
    files: BTreeMap<String, Vec<u8>>,
    #[serde(default)]
    requests: Vec<Request>,
    #[serde(default)]
    results: BTreeMap<RequestId, OracleResult>,
    #[serde(default)]
    reports: BTreeMap<RequestId, Vec<Report>>,
    #[serde(default)]
    proposals: BTreeMap<ProposalId, Proposal>,
    #[serde(default)]
    deposits: Vec<Deposit>,
    #[serde(default)]
    votes: Vec<Vote>,
    #[serde(default)]
    validators: BTreeMap<String, Validator>,
    #[serde(default)]
    validator_statuses: BTreeMap<String, ValidatorStatus>,
    #[serde(default)]
    reporters: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a data source and return its id.
    pub fn add_data_source(&mut self, ds: DataSource) -> DataSourceId {
        self.data_sources.push(ds);
        self.data_sources.len() as DataSourceId
    }

    /// Replace an existing data source; returns `false` if `id` is unknown.
    pub fn set_data_source(&mut self, id: DataSourceId, ds: DataSource) -> bool {
        match slot(&mut self.data_sources, id) {
            Some(existing) => {
                *existing = ds;
                true
            }
            None => false,
        }
    }

    pub fn add_oracle_script(&mut self, os: OracleScript) -> OracleScriptId {
        self.oracle_scripts.push(os);
        self.oracle_scripts.len() as OracleScriptId
    }

    pub fn set_oracle_script(&mut self, id: OracleScriptId, os: OracleScript) -> bool {
        match slot(&mut self.oracle_scripts, id) {
            Some(existing) => {
                *existing = os;
                true
            }
            None => false,
        }
    }

    pub fn add_file(&mut self, filename: impl Into<String>, content: Vec<u8>) {
        self.files.insert(filename.into(), content);
    }

    pub fn add_request(&mut self, req: Request) -> RequestId {
        self.requests.push(req);
        self.requests.len() as RequestId
    }

    pub fn add_report(&mut self, id: RequestId, report: Report) {
        self.reports.entry(id).or_default().push(report);
    }

    pub fn set_result(&mut self, id: RequestId, result: OracleResult) {
        self.results.insert(id, result);
    }

    pub fn set_proposal(&mut self, proposal: Proposal) {
        self.proposals.insert(proposal.id, proposal);
    }

    /// Insert or replace the depositor's cumulative deposit.
    pub fn set_deposit(&mut self, deposit: Deposit) {
        self.deposits
            .retain(|d| !(d.proposal_id == deposit.proposal_id && d.depositor == deposit.depositor));
        self.deposits.push(deposit);
    }

    pub fn set_vote(&mut self, vote: Vote) {
        self.votes
            .retain(|v| !(v.proposal_id == vote.proposal_id && v.voter == vote.voter));
        self.votes.push(vote);
    }

    pub fn set_validator(&mut self, validator: Validator) {
        self.validators
            .insert(validator.operator_address.clone(), validator);
    }

    pub fn set_validator_status(&mut self, operator_address: impl Into<String>, status: ValidatorStatus) {
        self.validator_statuses.insert(operator_address.into(), status);
    }

    pub fn add_reporter(&mut self, validator: impl Into<String>, reporter: impl Into<String>) {
        self.reporters
            .entry(validator.into())
            .or_default()
            .insert(reporter.into());
    }

    /// Returns `true` if the delegation existed.
    pub fn remove_reporter(&mut self, validator: &str, reporter: &str) -> bool {
        let Some(set) = self.reporters.get_mut(validator) else {
            return false;
        };
        let removed = set.remove(reporter);
        if set.is_empty() {
            self.reporters.remove(validator);
        }
        removed
    }
}

fn slot<T>(items: &mut [T], id: u64) -> Option<&mut T> {
    let idx = usize::try_from(id).ok()?.checked_sub(1)?;
    items.get_mut(idx)
}

fn lookup<T: Clone>(items: &[T], id: u64) -> Option<T> {
    let idx = usize::try_from(id).ok()?.checked_sub(1)?;
    items.get(idx).cloned()
}

impl StateReader for MemoryState {
    fn data_source(&self, id: DataSourceId) -> Option<DataSource> {
        lookup(&self.data_sources, id)
    }

    fn data_sources(&self) -> Vec<DataSource> {
        self.data_sources.clone()
    }

    fn oracle_script(&self, id: OracleScriptId) -> Option<OracleScript> {
        lookup(&self.oracle_scripts, id)
    }

    fn oracle_scripts(&self) -> Vec<OracleScript> {
        self.oracle_scripts.clone()
    }

    fn file(&self, filename: &str) -> Vec<u8> {
        self.files.get(filename).cloned().unwrap_or_default()
    }

    fn request_count(&self) -> u64 {
        self.requests.len() as u64
    }

    fn request(&self, id: RequestId) -> Option<Request> {
        lookup(&self.requests, id)
    }

    fn result(&self, id: RequestId) -> Option<OracleResult> {
        self.results.get(&id).cloned()
    }

    fn reports(&self, id: RequestId) -> Vec<Report> {
        self.reports.get(&id).cloned().unwrap_or_default()
    }

    fn proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.proposals.get(&id).cloned()
    }

    fn proposals(&self) -> Vec<Proposal> {
        self.proposals.values().cloned().collect()
    }

    fn deposit(&self, id: ProposalId, depositor: &str) -> Option<Deposit> {
        self.deposits
            .iter()
            .find(|d| d.proposal_id == id && d.depositor == depositor)
            .cloned()
    }

    fn deposits(&self, id: ProposalId) -> Vec<Deposit> {
        self.deposits
            .iter()
            .filter(|d| d.proposal_id == id)
            .cloned()
            .collect()
    }

    fn vote(&self, id: ProposalId, voter: &str) -> Option<Vote> {
        self.votes
            .iter()
            .find(|v| v.proposal_id == id && v.voter == voter)
            .cloned()
    }

    fn votes(&self, id: ProposalId) -> Vec<Vote> {
        self.votes
            .iter()
            .filter(|v| v.proposal_id == id)
            .cloned()
            .collect()
    }

    fn validator(&self, operator_address: &str) -> Option<Validator> {
        self.validators.get(operator_address).cloned()
    }

    fn validators(&self) -> Vec<Validator> {
        self.validators.values().cloned().collect()
    }

    fn validator_status(&self, operator_address: &str) -> ValidatorStatus {
        self.validator_statuses
            .get(operator_address)
            .cloned()
            .unwrap_or_default()
    }

    fn reporters(&self, validator: &str) -> Vec<String> {
        self.reporters
            .get(validator)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}
