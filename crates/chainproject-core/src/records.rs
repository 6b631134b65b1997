//! Per-entity record builders shared by the handlers and the bootstrap
//! projector, so both paths produce identically shaped payloads.

use serde_json::{json, Value};

use crate::error::ProjectionError;
use crate::sink::{ProjectionSink, Record, RecordKind};
use crate::state::StateReader;
use crate::types::{
    day_bucket, unix_nanos, BlockInfo, DataSource, DataSourceId, OracleScript, OracleScriptId,
    Proposal, ProposalId, RawReport, Request, RequestId, ResolveStatus, Vote,
};

/// Byte fields travel as lowercase hex.
pub fn encode_bytes(bytes: &[u8]) -> Value {
    Value::String(hex::encode(bytes))
}

/// Writes records for one block, optionally on behalf of one transaction.
///
/// Every entity record carries `tx_hash`: the originating transaction, or
/// `null` for bootstrap and end-of-block records. Counter records do not.
pub struct Emitter<'a> {
    state: &'a dyn StateReader,
    sink: &'a mut dyn ProjectionSink,
    block: &'a BlockInfo,
    tx_hash: Option<String>,
    written: usize,
}

impl<'a> Emitter<'a> {
    pub fn new(
        state: &'a dyn StateReader,
        sink: &'a mut dyn ProjectionSink,
        block: &'a BlockInfo,
    ) -> Self {
        Self {
            state,
            sink,
            block,
            tx_hash: None,
            written: 0,
        }
    }

    /// Attribute subsequent records to transaction `tx_hash` (`None` = no transaction).
    pub fn set_tx(&mut self, tx_hash: Option<String>) {
        self.tx_hash = tx_hash;
    }

    pub fn state(&self) -> &'a dyn StateReader {
        self.state
    }

    pub fn block(&self) -> &'a BlockInfo {
        self.block
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn tx_hash(&self) -> Value {
        self.tx_hash.clone().map_or(Value::Null, Value::String)
    }

    pub fn write(&mut self, kind: RecordKind, payload: Value) {
        self.written += 1;
        self.sink.write(Record::new(kind, payload));
    }

    // ─── Oracle registry ──────────────────────────────────────────────────────

    pub fn set_data_source(&mut self, id: DataSourceId, ds: &DataSource) {
        let executable = encode_bytes(&self.state.file(&ds.filename));
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::SetDataSource,
            json!({
                "id": id,
                "name": ds.name,
                "description": ds.description,
                "owner": ds.owner,
                "executable": executable,
                "tx_hash": tx_hash,
            }),
        );
    }

    pub fn set_oracle_script(&mut self, id: OracleScriptId, os: &OracleScript) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::SetOracleScript,
            json!({
                "id": id,
                "name": os.name,
                "description": os.description,
                "owner": os.owner,
                "schema": os.schema,
                "codehash": os.filename,
                "source_code_url": os.source_code_url,
                "tx_hash": tx_hash,
            }),
        );
    }

    // ─── Counters ─────────────────────────────────────────────────────────────

    pub fn new_data_source_request(&mut self, id: DataSourceId) {
        self.write(
            RecordKind::NewDataSourceRequest,
            json!({ "data_source_id": id, "count": 0 }),
        );
    }

    pub fn new_oracle_script_request(&mut self, id: OracleScriptId) {
        self.write(
            RecordKind::NewOracleScriptRequest,
            json!({ "oracle_script_id": id, "count": 0 }),
        );
    }

    pub fn update_data_source_request(&mut self, id: DataSourceId) {
        self.write(
            RecordKind::UpdateDataSourceRequest,
            json!({ "data_source_id": id }),
        );
    }

    pub fn update_oracle_script_request(&mut self, id: OracleScriptId) {
        self.write(
            RecordKind::UpdateOracleScriptRequest,
            json!({ "oracle_script_id": id }),
        );
    }

    pub fn update_related_ds_os(&mut self, ds: DataSourceId, os: OracleScriptId) {
        self.write(
            RecordKind::UpdateRelatedDsOs,
            json!({ "data_source_id": ds, "oracle_script_id": os }),
        );
    }

    /// Bump the request counter of the day containing the current block.
    pub fn set_request_count_per_day(&mut self) {
        let date = day_bucket(&self.block.time);
        self.write(RecordKind::SetRequestCountPerDay, json!({ "date": date }));
    }

    // ─── Requests, reports, results ───────────────────────────────────────────

    pub fn new_request(&mut self, id: RequestId, req: &Request, sender: Option<&str>) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::NewRequest,
            json!({
                "id": id,
                "tx_hash": tx_hash,
                "oracle_script_id": req.oracle_script_id,
                "calldata": encode_bytes(&req.calldata),
                "ask_count": req.ask_count(),
                "min_count": req.min_count,
                "sender": sender,
                "client_id": req.client_id,
                "resolve_status": ResolveStatus::Open.code(),
            }),
        );
    }

    pub fn raw_and_val_requests(&mut self, id: RequestId, req: &Request) {
        let tx_hash = self.tx_hash();
        for raw in &req.raw_requests {
            self.write(
                RecordKind::NewRawRequest,
                json!({
                    "request_id": id,
                    "external_id": raw.external_id,
                    "data_source_id": raw.data_source_id,
                    "calldata": encode_bytes(&raw.calldata),
                    "tx_hash": tx_hash,
                }),
            );
        }
        for val in &req.requested_validators {
            self.write(
                RecordKind::NewValRequest,
                json!({ "request_id": id, "validator": val, "tx_hash": tx_hash }),
            );
        }
    }

    pub fn report_and_raw_reports(
        &mut self,
        id: RequestId,
        validator: &str,
        reporter: Option<&str>,
        raw_reports: &[RawReport],
    ) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::NewReport,
            json!({
                "tx_hash": tx_hash,
                "request_id": id,
                "validator": validator,
                "reporter": reporter,
            }),
        );
        for raw in raw_reports {
            self.write(
                RecordKind::NewRawReport,
                json!({
                    "request_id": id,
                    "validator": validator,
                    "external_id": raw.external_id,
                    "data": encode_bytes(&raw.data),
                    "exit_code": raw.exit_code,
                    "tx_hash": tx_hash,
                }),
            );
        }
    }

    /// Final outcome of a resolved request.
    pub fn update_result(&mut self, id: RequestId) -> Result<(), ProjectionError> {
        let result = self.state.must_result(id)?;
        if !result.resolve_status.is_terminal() {
            return Err(ProjectionError::Other(format!(
                "result of request {id} has non-terminal status {:?}",
                result.resolve_status
            )));
        }
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::UpdateRequest,
            json!({
                "id": id,
                "request_time": result.request_time,
                "resolve_time": result.resolve_time,
                "resolve_status": result.resolve_status.code(),
                "result": encode_bytes(&result.result),
                "tx_hash": tx_hash,
            }),
        );
        Ok(())
    }

    // ─── Governance ───────────────────────────────────────────────────────────

    pub fn new_proposal(&mut self, proposal: &Proposal) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::NewProposal,
            json!({
                "id": proposal.id,
                "proposer": proposal.proposer,
                "type": proposal.content.proposal_type,
                "title": proposal.content.title,
                "description": proposal.content.description,
                "proposal_route": proposal.content.proposal_route,
                "status": proposal.status.code(),
                "submit_time": unix_nanos(&proposal.submit_time),
                "deposit_end_time": unix_nanos(&proposal.deposit_end_time),
                "total_deposit": proposal.total_deposit,
                "voting_time": unix_nanos(&proposal.voting_start_time),
                "voting_end_time": unix_nanos(&proposal.voting_end_time),
                "tx_hash": tx_hash,
            }),
        );
    }

    pub fn update_proposal(&mut self, proposal: &Proposal) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::UpdateProposal,
            json!({
                "id": proposal.id,
                "status": proposal.status.code(),
                "total_deposit": proposal.total_deposit,
                "voting_time": unix_nanos(&proposal.voting_start_time),
                "voting_end_time": unix_nanos(&proposal.voting_end_time),
                "tx_hash": tx_hash,
            }),
        );
    }

    pub fn set_deposit(&mut self, proposal_id: ProposalId, depositor: &str, amount: &str) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::SetDeposit,
            json!({
                "proposal_id": proposal_id,
                "depositor": depositor,
                "amount": amount,
                "tx_hash": tx_hash,
            }),
        );
    }

    pub fn set_vote(&mut self, vote: &Vote) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::SetVote,
            json!({
                "proposal_id": vote.proposal_id,
                "voter": vote.voter,
                "answer": vote.option.code(),
                "tx_hash": tx_hash,
            }),
        );
    }

    // ─── Validators and reporters ─────────────────────────────────────────────

    pub fn update_validator_status(&mut self, validator: &str) {
        let status = self.state.validator_status(validator);
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::UpdateValidatorStatus,
            json!({
                "validator": validator,
                "status": status.is_active,
                "status_since": unix_nanos(&status.since),
                "tx_hash": tx_hash,
            }),
        );
    }

    /// Append a status-change record stamped with the current block time.
    pub fn historical_validator_status(&mut self, validator: &str) {
        let status = self.state.validator_status(validator);
        let timestamp = unix_nanos(&self.block.time);
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::SetHistoricalValidatorStatus,
            json!({
                "operator_address": validator,
                "status": status.is_active,
                "timestamp": timestamp,
                "tx_hash": tx_hash,
            }),
        );
    }

    pub fn set_reporter(&mut self, reporter: &str, validator: &str) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::SetReporter,
            json!({ "reporter": reporter, "validator": validator, "tx_hash": tx_hash }),
        );
    }

    pub fn remove_reporter(&mut self, reporter: &str, validator: &str) {
        let tx_hash = self.tx_hash();
        self.write(
            RecordKind::RemoveReporter,
            json!({ "reporter": reporter, "validator": validator, "tx_hash": tx_hash }),
        );
    }
}
