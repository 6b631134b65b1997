//! Handler Table — one handler per message kind and per end-of-block event.
//!
//! The table is built once when the projector is constructed; there is no
//! runtime registration. Dispatch is synchronous and order-preserving.

mod gov;
mod oracle;

use std::collections::HashMap;

use serde::Serialize;

use crate::attributes::{keys, AttributeIndex, Event};
use crate::config::ProjectorConfig;
use crate::error::ProjectionError;
use crate::msg::{Msg, MsgKind};
use crate::records::Emitter;

/// Auxiliary enrichment requested by handlers, consumed outside the projector
/// (e.g. by a transaction log indexer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MsgExtra {
    /// Ledger id created or touched by the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_moniker: Option<String>,
    /// Accounts involved in the message besides its signer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_accounts: Vec<String>,
}

/// A message being dispatched, with its correlation context.
pub struct MsgInput<'a> {
    pub msg: &'a Msg,
    /// Attributes of the whole transaction.
    pub attrs: &'a AttributeIndex,
    /// How many messages of the same kind precede this one in the transaction.
    pub occurrence: usize,
}

impl MsgInput<'_> {
    /// Correlated id for this occurrence of the message.
    pub fn id(&self, event_type: &str, key: &str) -> Result<u64, ProjectionError> {
        self.attrs.occurrence_u64(event_type, key, self.occurrence)
    }
}

pub type MsgHandler =
    fn(&mut Emitter<'_>, &MsgInput<'_>, &mut MsgExtra) -> Result<(), ProjectionError>;

pub type EndBlockHandler = fn(&mut Emitter<'_>, &AttributeIndex) -> Result<(), ProjectionError>;

pub(crate) fn mismatch(handler: &'static str, msg: &Msg) -> ProjectionError {
    ProjectionError::HandlerMismatch {
        handler,
        got: msg.kind().to_string(),
    }
}

/// Static mapping from message kind / event type to its handler.
pub struct HandlerTable {
    msgs: HashMap<MsgKind, MsgHandler>,
    events: HashMap<&'static str, EndBlockHandler>,
}

impl HandlerTable {
    /// The full table for `config`.
    pub fn new(config: &ProjectorConfig) -> Self {
        let mut msgs: HashMap<MsgKind, MsgHandler> = HashMap::new();
        let mut events: HashMap<&'static str, EndBlockHandler> = HashMap::new();

        msgs.insert(MsgKind::RequestData, oracle::handle_request_data);
        msgs.insert(MsgKind::ReportData, oracle::handle_report_data);
        msgs.insert(MsgKind::CreateDataSource, oracle::handle_create_data_source);
        msgs.insert(MsgKind::EditDataSource, oracle::handle_edit_data_source);
        msgs.insert(MsgKind::CreateOracleScript, oracle::handle_create_oracle_script);
        msgs.insert(MsgKind::EditOracleScript, oracle::handle_edit_oracle_script);
        msgs.insert(MsgKind::Activate, oracle::handle_activate);
        msgs.insert(MsgKind::AddReporter, oracle::handle_add_reporter);
        msgs.insert(MsgKind::RemoveReporter, oracle::handle_remove_reporter);
        events.insert(keys::EVENT_RESOLVE, oracle::handle_resolve);
        events.insert(keys::EVENT_DEACTIVATE, oracle::handle_deactivate);

        if config.gov {
            msgs.insert(MsgKind::SubmitProposal, gov::handle_submit_proposal);
            msgs.insert(MsgKind::Deposit, gov::handle_deposit);
            msgs.insert(MsgKind::Vote, gov::handle_vote);
            events.insert(keys::EVENT_ACTIVE_PROPOSAL, gov::handle_active_proposal);
        }

        Self { msgs, events }
    }

    pub fn handles_msg(&self, kind: MsgKind) -> bool {
        self.msgs.contains_key(&kind)
    }

    pub fn handles_event(&self, event_type: &str) -> bool {
        self.events.contains_key(event_type)
    }

    /// Run the handler for `input.msg`. Returns `false` if the kind is not projected.
    pub fn dispatch_msg(
        &self,
        emit: &mut Emitter<'_>,
        input: &MsgInput<'_>,
        extra: &mut MsgExtra,
    ) -> Result<bool, ProjectionError> {
        let Some(handler) = self.msgs.get(&input.msg.kind()) else {
            return Ok(false);
        };
        tracing::debug!(
            kind = %input.msg.kind(),
            occurrence = input.occurrence,
            "Dispatching message"
        );
        handler(emit, input, extra)?;
        Ok(true)
    }

    /// Run the handler for an end-of-block event. Returns `false` if unhandled.
    ///
    /// Each event is correlated on its own: the handler reads occurrence 0.
    pub fn dispatch_event(
        &self,
        emit: &mut Emitter<'_>,
        event: &Event,
    ) -> Result<bool, ProjectionError> {
        let Some(handler) = self.events.get(event.kind.as_str()) else {
            return Ok(false);
        };
        tracing::debug!(event = %event.kind, "Dispatching end-block event");
        let attrs = AttributeIndex::build(std::slice::from_ref(event));
        handler(emit, &attrs)?;
        Ok(true)
    }
}
