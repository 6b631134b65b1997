//! Oracle module handlers: data sources, oracle scripts, requests, reports,
//! reporter delegation and validator activity.

use crate::attributes::{keys, AttributeIndex};
use crate::error::ProjectionError;
use crate::msg::Msg;
use crate::records::Emitter;

use super::{mismatch, MsgExtra, MsgInput};

pub(super) fn handle_request_data(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::RequestData(msg) = input.msg else {
        return Err(mismatch("request_data", input.msg));
    };
    let id = input.id(keys::EVENT_REQUEST, keys::ATTR_ID)?;
    let state = emit.state();
    let req = state.must_request(id)?;
    let os = state.must_oracle_script(req.oracle_script_id)?;

    emit.new_request(id, &req, Some(&msg.sender));
    emit.raw_and_val_requests(id, &req);
    emit.set_request_count_per_day();
    emit.update_oracle_script_request(req.oracle_script_id);
    for raw in &req.raw_requests {
        emit.update_data_source_request(raw.data_source_id);
        emit.update_related_ds_os(raw.data_source_id, req.oracle_script_id);
    }

    extra.id = Some(id);
    extra.name = Some(os.name);
    extra.schema = Some(os.schema);
    Ok(())
}

pub(super) fn handle_report_data(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::ReportData(msg) = input.msg else {
        return Err(mismatch("report_data", input.msg));
    };
    let state = emit.state();
    let req = state.must_request(msg.request_id)?;
    if !req.requested_validators.contains(&msg.validator) {
        return Err(ProjectionError::missing(
            "requested validator",
            format!("{}/{}", msg.request_id, msg.validator),
        ));
    }
    let report = state
        .reports(msg.request_id)
        .into_iter()
        .find(|r| r.validator == msg.validator)
        .ok_or_else(|| {
            ProjectionError::missing("report", format!("{}/{}", msg.request_id, msg.validator))
        })?;

    emit.report_and_raw_reports(
        msg.request_id,
        &report.validator,
        Some(&msg.reporter),
        &report.raw_reports,
    );

    extra.id = Some(msg.request_id);
    extra.related_accounts.push(msg.reporter.clone());
    Ok(())
}

pub(super) fn handle_create_data_source(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    if !matches!(input.msg, Msg::CreateDataSource(_)) {
        return Err(mismatch("create_data_source", input.msg));
    }
    let id = input.id(keys::EVENT_CREATE_DATA_SOURCE, keys::ATTR_ID)?;
    let ds = emit.state().must_data_source(id)?;
    emit.set_data_source(id, &ds);
    emit.new_data_source_request(id);
    extra.id = Some(id);
    extra.name = Some(ds.name);
    Ok(())
}

pub(super) fn handle_edit_data_source(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::EditDataSource(msg) = input.msg else {
        return Err(mismatch("edit_data_source", input.msg));
    };
    let ds = emit.state().must_data_source(msg.data_source_id)?;
    emit.set_data_source(msg.data_source_id, &ds);
    extra.id = Some(msg.data_source_id);
    Ok(())
}

pub(super) fn handle_create_oracle_script(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    if !matches!(input.msg, Msg::CreateOracleScript(_)) {
        return Err(mismatch("create_oracle_script", input.msg));
    }
    let id = input.id(keys::EVENT_CREATE_ORACLE_SCRIPT, keys::ATTR_ID)?;
    let os = emit.state().must_oracle_script(id)?;
    emit.set_oracle_script(id, &os);
    emit.new_oracle_script_request(id);
    extra.id = Some(id);
    extra.name = Some(os.name);
    Ok(())
}

pub(super) fn handle_edit_oracle_script(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::EditOracleScript(msg) = input.msg else {
        return Err(mismatch("edit_oracle_script", input.msg));
    };
    let os = emit.state().must_oracle_script(msg.oracle_script_id)?;
    emit.set_oracle_script(msg.oracle_script_id, &os);
    extra.id = Some(msg.oracle_script_id);
    Ok(())
}

pub(super) fn handle_activate(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    _extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::Activate(msg) = input.msg else {
        return Err(mismatch("activate", input.msg));
    };
    emit.update_validator_status(&msg.validator);
    emit.historical_validator_status(&msg.validator);
    Ok(())
}

pub(super) fn handle_add_reporter(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::AddReporter(msg) = input.msg else {
        return Err(mismatch("add_reporter", input.msg));
    };
    extra.validator_moniker = emit.state().validator(&msg.validator).map(|v| v.moniker);
    extra.related_accounts.push(msg.reporter.clone());
    emit.set_reporter(&msg.reporter, &msg.validator);
    Ok(())
}

pub(super) fn handle_remove_reporter(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::RemoveReporter(msg) = input.msg else {
        return Err(mismatch("remove_reporter", input.msg));
    };
    extra.validator_moniker = emit.state().validator(&msg.validator).map(|v| v.moniker);
    extra.related_accounts.push(msg.reporter.clone());
    emit.remove_reporter(&msg.reporter, &msg.validator);
    Ok(())
}

pub(super) fn handle_resolve(
    emit: &mut Emitter<'_>,
    attrs: &AttributeIndex,
) -> Result<(), ProjectionError> {
    let id = attrs.occurrence_u64(keys::EVENT_RESOLVE, keys::ATTR_ID, 0)?;
    emit.update_result(id)
}

pub(super) fn handle_deactivate(
    emit: &mut Emitter<'_>,
    attrs: &AttributeIndex,
) -> Result<(), ProjectionError> {
    let validator = attrs.occurrence(keys::EVENT_DEACTIVATE, keys::ATTR_VALIDATOR, 0)?;
    emit.update_validator_status(validator);
    emit.historical_validator_status(validator);
    Ok(())
}
