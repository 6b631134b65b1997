//! Governance handlers.

use crate::attributes::{keys, AttributeIndex};
use crate::error::ProjectionError;
use crate::msg::Msg;
use crate::records::Emitter;

use super::{mismatch, MsgExtra, MsgInput};

pub(super) fn handle_submit_proposal(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::SubmitProposal(msg) = input.msg else {
        return Err(mismatch("submit_proposal", input.msg));
    };
    let id = input.id(keys::EVENT_SUBMIT_PROPOSAL, keys::ATTR_PROPOSAL_ID)?;
    let proposal = emit.state().must_proposal(id)?;
    emit.new_proposal(&proposal);
    emit.set_deposit(id, &msg.proposer, &msg.initial_deposit);
    extra.id = Some(id);
    Ok(())
}

pub(super) fn handle_deposit(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::Deposit(msg) = input.msg else {
        return Err(mismatch("deposit", input.msg));
    };
    let state = emit.state();
    let deposit = state
        .deposit(msg.proposal_id, &msg.depositor)
        .ok_or_else(|| {
            ProjectionError::missing("deposit", format!("{}/{}", msg.proposal_id, msg.depositor))
        })?;
    let proposal = state.must_proposal(msg.proposal_id)?;
    emit.set_deposit(deposit.proposal_id, &deposit.depositor, &deposit.amount);
    emit.update_proposal(&proposal);
    extra.id = Some(msg.proposal_id);
    Ok(())
}

pub(super) fn handle_vote(
    emit: &mut Emitter<'_>,
    input: &MsgInput<'_>,
    extra: &mut MsgExtra,
) -> Result<(), ProjectionError> {
    let Msg::Vote(msg) = input.msg else {
        return Err(mismatch("vote", input.msg));
    };
    let vote = emit
        .state()
        .vote(msg.proposal_id, &msg.voter)
        .ok_or_else(|| ProjectionError::missing("vote", format!("{}/{}", msg.proposal_id, msg.voter)))?;
    emit.set_vote(&vote);
    extra.id = Some(msg.proposal_id);
    Ok(())
}

pub(super) fn handle_active_proposal(
    emit: &mut Emitter<'_>,
    attrs: &AttributeIndex,
) -> Result<(), ProjectionError> {
    let id = attrs.occurrence_u64(keys::EVENT_ACTIVE_PROPOSAL, keys::ATTR_PROPOSAL_ID, 0)?;
    let proposal = emit.state().must_proposal(id)?;
    emit.update_proposal(&proposal);
    Ok(())
}
