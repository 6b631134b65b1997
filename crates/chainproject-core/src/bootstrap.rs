//! Bootstrap Projector — synthesizes the record stream for an index built
//! from current ledger state alone.
//!
//! Entities are walked in ascending id order rather than chronologically,
//! but a request's sub-records always follow its `NEW_REQUEST`, and the
//! resulting index matches one built incrementally.

use serde::Serialize;

use crate::config::ProjectorConfig;
use crate::error::ProjectionError;
use crate::records::Emitter;
use crate::types::{RequestId, ValidatorStatus};

/// Counts of what a bootstrap pass emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapStats {
    pub data_sources: u64,
    pub oracle_scripts: u64,
    pub requests: u64,
    pub results: u64,
    pub reports: u64,
    pub proposals: u64,
    pub validators: u64,
    pub records: usize,
}

/// Emit the full current state through `emit`, which must carry no transaction.
pub fn run(emit: &mut Emitter<'_>, config: &ProjectorConfig) -> Result<BootstrapStats, ProjectionError> {
    let mut stats = BootstrapStats::default();
    let start = emit.written();

    oracle_registry(emit, &mut stats);
    requests(emit, &mut stats)?;
    if config.gov {
        governance(emit, &mut stats);
    }
    if config.validators {
        validators(emit, &mut stats);
    }

    stats.records = emit.written() - start;
    tracing::info!(
        chain = %config.chain_id,
        height = emit.block().height,
        records = stats.records,
        requests = stats.requests,
        "Bootstrap complete"
    );
    Ok(stats)
}

fn oracle_registry(emit: &mut Emitter<'_>, stats: &mut BootstrapStats) {
    let state = emit.state();
    for (id, ds) in (1..).zip(state.data_sources()) {
        emit.set_data_source(id, &ds);
        emit.new_data_source_request(id);
        stats.data_sources += 1;
    }
    for (id, os) in (1..).zip(state.oracle_scripts()) {
        emit.set_oracle_script(id, &os);
        emit.new_oracle_script_request(id);
        stats.oracle_scripts += 1;
    }
    tracing::info!(
        data_sources = stats.data_sources,
        oracle_scripts = stats.oracle_scripts,
        "Bootstrapped oracle registry"
    );
}

fn requests(emit: &mut Emitter<'_>, stats: &mut BootstrapStats) -> Result<(), ProjectionError> {
    let state = emit.state();
    let count: RequestId = state.request_count();
    for id in 1..=count {
        let req = state.must_request(id)?;
        emit.new_request(id, &req, None);
        emit.raw_and_val_requests(id, &req);
        if state.result(id).is_some() {
            emit.update_result(id)?;
            stats.results += 1;
        }
        for report in state.reports(id) {
            emit.report_and_raw_reports(id, &report.validator, None, &report.raw_reports);
            stats.reports += 1;
        }
        stats.requests += 1;
    }
    tracing::info!(requests = stats.requests, results = stats.results, "Bootstrapped requests");
    Ok(())
}

fn governance(emit: &mut Emitter<'_>, stats: &mut BootstrapStats) {
    let state = emit.state();
    for proposal in state.proposals() {
        emit.new_proposal(&proposal);
        for deposit in state.deposits(proposal.id) {
            emit.set_deposit(deposit.proposal_id, &deposit.depositor, &deposit.amount);
        }
        for vote in state.votes(proposal.id) {
            emit.set_vote(&vote);
        }
        stats.proposals += 1;
    }
}

fn validators(emit: &mut Emitter<'_>, stats: &mut BootstrapStats) {
    let state = emit.state();
    for validator in state.validators() {
        let addr = &validator.operator_address;
        // Never-activated validators have no status row downstream.
        if state.validator_status(addr) != ValidatorStatus::default() {
            emit.update_validator_status(addr);
        }
        for reporter in state.reporters(addr) {
            emit.set_reporter(&reporter, addr);
        }
        stats.validators += 1;
    }
}
