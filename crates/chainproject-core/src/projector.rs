//! Block-level driver: correlates each transaction's events, dispatches its
//! messages in order, then runs end-of-block events through the same table.
//!
//! Projection of block N completes before block N+1 executes. Nothing here
//! suspends or retries; any error halts the node.

use std::collections::HashMap;

use serde::Serialize;

use crate::attributes::{AttributeIndex, Event};
use crate::bootstrap::{self, BootstrapStats};
use crate::config::ProjectorConfig;
use crate::error::ProjectionError;
use crate::handlers::{HandlerTable, MsgExtra, MsgInput};
use crate::msg::{MsgKind, TxOutcome};
use crate::records::Emitter;
use crate::sink::ProjectionSink;
use crate::state::StateReader;
use crate::types::BlockInfo;

/// Summary of one projected block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockStats {
    pub height: u64,
    pub txs: usize,
    pub failed_txs: usize,
    pub end_block_events: usize,
    pub records: usize,
}

/// Projects ledger outcomes into the record stream.
pub struct Projector {
    config: ProjectorConfig,
    table: HandlerTable,
}

impl Projector {
    pub fn new(config: ProjectorConfig) -> Self {
        let table = HandlerTable::new(&config);
        Self { config, table }
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    pub fn table(&self) -> &HandlerTable {
        &self.table
    }

    /// Project one executed transaction. Returns one [`MsgExtra`] per message.
    pub fn project_tx(
        &self,
        state: &dyn StateReader,
        sink: &mut dyn ProjectionSink,
        block: &BlockInfo,
        tx: &TxOutcome,
    ) -> Result<Vec<MsgExtra>, ProjectionError> {
        let mut emit = Emitter::new(state, sink, block);
        self.tx(&mut emit, tx)
    }

    fn tx(&self, emit: &mut Emitter<'_>, tx: &TxOutcome) -> Result<Vec<MsgExtra>, ProjectionError> {
        let mut extras = vec![MsgExtra::default(); tx.msgs.len()];
        if !tx.success {
            tracing::debug!(tx = %tx.hash_hex(), "Skipping failed transaction");
            return Ok(extras);
        }

        let attrs = AttributeIndex::build(&tx.events);
        let mut seen: HashMap<MsgKind, usize> = HashMap::new();
        emit.set_tx(Some(tx.hash_hex()));

        for (msg, extra) in tx.msgs.iter().zip(extras.iter_mut()) {
            let occurrence = seen.entry(msg.kind()).or_insert(0);
            let input = MsgInput {
                msg,
                attrs: &attrs,
                occurrence: *occurrence,
            };
            *occurrence += 1;
            if let Err(e) = self.table.dispatch_msg(emit, &input, extra) {
                tracing::error!(
                    height = emit.block().height,
                    tx = %tx.hash_hex(),
                    kind = %msg.kind(),
                    error = %e,
                    "Projection halted"
                );
                return Err(e);
            }
        }
        emit.set_tx(None);
        Ok(extras)
    }

    /// Project end-of-block events (resolutions, deactivations, ...), in order.
    pub fn project_end_block(
        &self,
        state: &dyn StateReader,
        sink: &mut dyn ProjectionSink,
        block: &BlockInfo,
        events: &[Event],
    ) -> Result<usize, ProjectionError> {
        let mut emit = Emitter::new(state, sink, block);
        self.end_block(&mut emit, events)
    }

    fn end_block(&self, emit: &mut Emitter<'_>, events: &[Event]) -> Result<usize, ProjectionError> {
        let mut handled = 0;
        for event in events {
            match self.table.dispatch_event(emit, event) {
                Ok(true) => handled += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        height = emit.block().height,
                        event = %event.kind,
                        error = %e,
                        "Projection halted"
                    );
                    return Err(e);
                }
            }
        }
        Ok(handled)
    }

    /// Project a whole block: its transactions in order, then end-block events.
    pub fn project_block(
        &self,
        state: &dyn StateReader,
        sink: &mut dyn ProjectionSink,
        block: &BlockInfo,
        txs: &[TxOutcome],
        end_block_events: &[Event],
    ) -> Result<BlockStats, ProjectionError> {
        let mut emit = Emitter::new(state, sink, block);
        let mut stats = BlockStats {
            height: block.height,
            txs: txs.len(),
            ..Default::default()
        };
        for tx in txs {
            if !tx.success {
                stats.failed_txs += 1;
            }
            self.tx(&mut emit, tx)?;
        }
        stats.end_block_events = self.end_block(&mut emit, end_block_events)?;
        stats.records = emit.written();
        tracing::info!(
            chain = %self.config.chain_id,
            height = stats.height,
            txs = stats.txs,
            records = stats.records,
            "Block projected"
        );
        Ok(stats)
    }

    /// Emit the current ledger state as a fresh record stream.
    pub fn bootstrap(
        &self,
        state: &dyn StateReader,
        sink: &mut dyn ProjectionSink,
        block: &BlockInfo,
    ) -> Result<BootstrapStats, ProjectionError> {
        let mut emit = Emitter::new(state, sink, block);
        bootstrap::run(&mut emit, &self.config)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::keys::*;
    use crate::config::ProjectorBuilder;
    use crate::msg::*;
    use crate::sink::{Record, RecordKind};
    use crate::state::MemoryState;
    use crate::types::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn block(height: u64) -> BlockInfo {
        BlockInfo {
            height,
            time: t(height as i64 * 3),
            hash: format!("{height:064X}"),
        }
    }

    fn kinds(records: &[Record]) -> Vec<RecordKind> {
        records.iter().map(|r| r.kind).collect()
    }

    fn oracle_state() -> MemoryState {
        let mut state = MemoryState::new();
        for name in ["coingecko", "binance"] {
            state.add_data_source(DataSource {
                owner: "band1owner".into(),
                name: name.into(),
                description: format!("{name} prices"),
                filename: format!("{name}.py"),
            });
        }
        state.add_oracle_script(OracleScript {
            owner: "band1owner".into(),
            name: "crypto_price".into(),
            description: "median price".into(),
            filename: "crypto_price.wasm".into(),
            schema: "{symbol:string}/{px:u64}".into(),
            source_code_url: "https://example.org/src".into(),
        });
        for v in ["bandvaloper1a", "bandvaloper1b", "bandvaloper1c", "bandvaloper1d"] {
            state.set_validator(Validator {
                operator_address: v.into(),
                moniker: format!("moniker-{v}"),
            });
        }
        state
    }

    fn request(state: &mut MemoryState, client_id: &str) -> RequestId {
        state.add_request(Request {
            oracle_script_id: 1,
            calldata: vec![0xbe, 0xef],
            requested_validators: vec![
                "bandvaloper1a".into(),
                "bandvaloper1b".into(),
                "bandvaloper1c".into(),
                "bandvaloper1d".into(),
            ],
            min_count: 3,
            client_id: client_id.into(),
            request_height: 2,
            request_time: 1_700_000_006,
            raw_requests: vec![
                RawRequest { external_id: 1, data_source_id: 1, calldata: b"BTC".to_vec() },
                RawRequest { external_id: 2, data_source_id: 2, calldata: b"BTC".to_vec() },
            ],
        })
    }

    fn request_msg(client_id: &str) -> Msg {
        Msg::RequestData(MsgRequestData {
            oracle_script_id: 1,
            calldata: vec![0xbe, 0xef],
            ask_count: 4,
            min_count: 3,
            client_id: client_id.into(),
            sender: "band1sender".into(),
        })
    }

    fn tx(hash: u8, msgs: Vec<Msg>, events: Vec<Event>) -> TxOutcome {
        TxOutcome {
            hash: vec![hash; 4],
            success: true,
            msgs,
            events,
        }
    }

    #[test]
    fn request_emits_request_raw_and_val_records() {
        let mut state = oracle_state();
        let id = request(&mut state, "c1");
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0xaa,
            vec![request_msg("c1")],
            vec![Event::new(EVENT_REQUEST, [(ATTR_ID, id.to_string())])],
        );

        let extras = projector.project_tx(&state, &mut out, &block(2), &tx).unwrap();

        let count = |k: RecordKind| out.iter().filter(|r| r.kind == k).count();
        assert_eq!(count(RecordKind::NewRequest), 1);
        assert_eq!(count(RecordKind::NewRawRequest), 2);
        assert_eq!(count(RecordKind::NewValRequest), 4);
        for r in out.iter().filter(|r| {
            matches!(r.kind, RecordKind::NewRawRequest | RecordKind::NewValRequest)
        }) {
            assert_eq!(r.get("request_id"), Some(&json!(id)));
        }
        assert_eq!(out[0].kind, RecordKind::NewRequest);
        assert_eq!(out[0].get("tx_hash"), Some(&json!("AAAAAAAA")));
        assert_eq!(out[0].get("ask_count"), Some(&json!(4)));
        assert_eq!(out[0].get("calldata"), Some(&json!("beef")));
        assert_eq!(count(RecordKind::UpdateDataSourceRequest), 2);
        assert_eq!(count(RecordKind::UpdateRelatedDsOs), 2);
        assert_eq!(count(RecordKind::UpdateOracleScriptRequest), 1);
        assert_eq!(count(RecordKind::SetRequestCountPerDay), 1);

        assert_eq!(extras[0].id, Some(id));
        assert_eq!(extras[0].name.as_deref(), Some("crypto_price"));
    }

    #[test]
    fn repeated_messages_consume_attributes_positionally() {
        let mut state = oracle_state();
        let first = request(&mut state, "first");
        let second = request(&mut state, "second");
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x01,
            vec![request_msg("first"), request_msg("second")],
            vec![
                Event::new(EVENT_REQUEST, [(ATTR_ID, first.to_string())]),
                Event::new(EVENT_REQUEST, [(ATTR_ID, second.to_string())]),
            ],
        );

        projector.project_tx(&state, &mut out, &block(2), &tx).unwrap();

        let ids: Vec<_> = out
            .iter()
            .filter(|r| r.kind == RecordKind::NewRequest)
            .map(|r| (r.get("id").cloned(), r.get("client_id").cloned()))
            .collect();
        assert_eq!(
            ids,
            vec![
                (Some(json!(first)), Some(json!("first"))),
                (Some(json!(second)), Some(json!("second"))),
            ]
        );
    }

    #[test]
    fn missing_attribute_value_is_fatal() {
        let mut state = oracle_state();
        let id = request(&mut state, "a");
        request(&mut state, "b");
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x02,
            vec![request_msg("a"), request_msg("b")],
            vec![Event::new(EVENT_REQUEST, [(ATTR_ID, id.to_string())])],
        );
        let err = projector.project_tx(&state, &mut out, &block(2), &tx).unwrap_err();
        assert!(err.is_correlation());
    }

    #[test]
    fn failed_tx_emits_nothing() {
        let state = oracle_state();
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let mut failed = tx(0x03, vec![request_msg("x")], vec![]);
        failed.success = false;
        let extras = projector.project_tx(&state, &mut out, &block(2), &failed).unwrap();
        assert!(out.is_empty());
        assert_eq!(extras.len(), 1);
    }

    #[test]
    fn unprojected_messages_do_not_shift_occurrences() {
        let mut state = oracle_state();
        let id = request(&mut state, "only");
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x04,
            vec![
                Msg::Other { type_url: "/cosmos.bank.v1beta1.MsgSend".into() },
                request_msg("only"),
            ],
            vec![
                Event::new("transfer", [("amount", "1uband")]),
                Event::new(EVENT_REQUEST, [(ATTR_ID, id.to_string())]),
            ],
        );
        let extras = projector.project_tx(&state, &mut out, &block(2), &tx).unwrap();
        assert_eq!(extras[0], MsgExtra::default());
        assert_eq!(extras[1].id, Some(id));
    }

    #[test]
    fn submit_proposal_emits_proposal_then_deposit() {
        let mut state = MemoryState::new();
        state.set_proposal(Proposal {
            id: 1,
            proposer: "band1proposer".into(),
            content: ProposalContent {
                proposal_type: "Text".into(),
                title: "Upgrade".into(),
                description: "Do it".into(),
                proposal_route: "gov".into(),
            },
            status: ProposalStatus::DepositPeriod,
            submit_time: t(0),
            deposit_end_time: t(86_400),
            total_deposit: "100uband".into(),
            voting_start_time: DateTime::<Utc>::default(),
            voting_end_time: DateTime::<Utc>::default(),
        });
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x05,
            vec![Msg::SubmitProposal(MsgSubmitProposal {
                proposer: "band1proposer".into(),
                content: ProposalContent {
                    proposal_type: "Text".into(),
                    title: "Upgrade".into(),
                    description: "Do it".into(),
                    proposal_route: "gov".into(),
                },
                initial_deposit: "100uband".into(),
            })],
            vec![Event::new(EVENT_SUBMIT_PROPOSAL, [(ATTR_PROPOSAL_ID, "1")])],
        );

        let extras = projector.project_tx(&state, &mut out, &block(1), &tx).unwrap();

        assert_eq!(kinds(&out), vec![RecordKind::NewProposal, RecordKind::SetDeposit]);
        assert_eq!(out[0].get("id"), Some(&json!(1)));
        assert_eq!(out[0].get("status"), Some(&json!(1)));
        assert_eq!(out[1].get("proposal_id"), Some(&json!(1)));
        assert_eq!(out[1].get("amount"), Some(&json!("100uband")));
        assert_eq!(out[1].get("depositor"), Some(&json!("band1proposer")));
        assert_eq!(extras[0].id, Some(1));
    }

    #[test]
    fn gov_disabled_skips_proposals() {
        let state = MemoryState::new();
        let projector = ProjectorBuilder::new().gov(false).build();
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x06,
            vec![Msg::Vote(MsgVote { proposal_id: 1, voter: "band1v".into(), option: VoteOption::Yes })],
            vec![],
        );
        projector.project_tx(&state, &mut out, &block(1), &tx).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn unset_voting_times_project_as_zero() {
        let unset: DateTime<Utc> = "0001-01-01T00:00:00Z".parse().unwrap();
        let mut state = MemoryState::new();
        state.set_proposal(Proposal {
            id: 1,
            proposer: "band1proposer".into(),
            content: ProposalContent {
                proposal_type: "Text".into(),
                title: "Upgrade".into(),
                description: "Do it".into(),
                proposal_route: "gov".into(),
            },
            status: ProposalStatus::DepositPeriod,
            submit_time: t(0),
            deposit_end_time: t(86_400),
            total_deposit: "10uband".into(),
            voting_start_time: unset,
            voting_end_time: unset,
        });
        state.set_deposit(Deposit {
            proposal_id: 1,
            depositor: "band1proposer".into(),
            amount: "10uband".into(),
        });
        let projector = Projector::new(ProjectorConfig::default());

        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x0c,
            vec![Msg::SubmitProposal(MsgSubmitProposal {
                proposer: "band1proposer".into(),
                content: state.proposal(1).unwrap().content,
                initial_deposit: "10uband".into(),
            })],
            vec![Event::new(EVENT_SUBMIT_PROPOSAL, [(ATTR_PROPOSAL_ID, "1")])],
        );
        projector.project_tx(&state, &mut out, &block(1), &tx).unwrap();
        assert_eq!(out[0].kind, RecordKind::NewProposal);
        assert_eq!(out[0].get("voting_time"), Some(&json!(0)));
        assert_eq!(out[0].get("voting_end_time"), Some(&json!(0)));
        assert_eq!(out[0].get("submit_time"), Some(&json!(unix_nanos(&t(0)))));

        let mut rebuilt: Vec<Record> = Vec::new();
        projector.bootstrap(&state, &mut rebuilt, &block(2)).unwrap();
        let proposal = rebuilt
            .iter()
            .find(|r| r.kind == RecordKind::NewProposal)
            .unwrap();
        assert_eq!(proposal.get("voting_time"), Some(&json!(0)));
        assert_eq!(proposal.get("voting_end_time"), Some(&json!(0)));
    }

    #[test]
    fn edit_oracle_script_emits_current_snapshot() {
        let mut state = oracle_state();
        let mut edited = state.oracle_script(1).unwrap();
        edited.description = "weighted median".into();
        edited.source_code_url = "https://example.org/v2".into();
        state.set_oracle_script(1, edited);
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x0d,
            vec![Msg::EditOracleScript(MsgEditOracleScript {
                oracle_script_id: 1,
                sender: "band1owner".into(),
            })],
            vec![],
        );

        let extras = projector.project_tx(&state, &mut out, &block(3), &tx).unwrap();

        assert_eq!(kinds(&out), vec![RecordKind::SetOracleScript]);
        assert_eq!(out[0].get("id"), Some(&json!(1)));
        assert_eq!(out[0].get("description"), Some(&json!("weighted median")));
        assert_eq!(out[0].get("source_code_url"), Some(&json!("https://example.org/v2")));
        assert_eq!(out[0].get("codehash"), Some(&json!("crypto_price.wasm")));
        assert_eq!(out[0].get("tx_hash"), Some(&json!("0D0D0D0D")));
        assert_eq!(extras[0].id, Some(1));
    }

    #[test]
    fn editing_unknown_oracle_script_is_fatal() {
        let state = oracle_state();
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x0e,
            vec![Msg::EditOracleScript(MsgEditOracleScript {
                oracle_script_id: 9,
                sender: "band1owner".into(),
            })],
            vec![],
        );
        let err = projector.project_tx(&state, &mut out, &block(3), &tx).unwrap_err();
        assert!(matches!(err, ProjectionError::MissingEntity { entity: "oracle script", .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn add_then_remove_reporter() {
        let mut state = oracle_state();
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();

        state.add_reporter("bandvaloper1a", "band1reporter");
        let add = tx(
            0x07,
            vec![Msg::AddReporter(MsgAddReporter {
                validator: "bandvaloper1a".into(),
                reporter: "band1reporter".into(),
            })],
            vec![],
        );
        let extras = projector.project_tx(&state, &mut out, &block(3), &add).unwrap();
        assert_eq!(extras[0].validator_moniker.as_deref(), Some("moniker-bandvaloper1a"));
        assert_eq!(extras[0].related_accounts, vec!["band1reporter".to_string()]);

        state.remove_reporter("bandvaloper1a", "band1reporter");
        let remove = tx(
            0x08,
            vec![Msg::RemoveReporter(MsgRemoveReporter {
                validator: "bandvaloper1a".into(),
                reporter: "band1reporter".into(),
            })],
            vec![],
        );
        projector.project_tx(&state, &mut out, &block(4), &remove).unwrap();

        assert_eq!(kinds(&out), vec![RecordKind::SetReporter, RecordKind::RemoveReporter]);
        for r in &out {
            assert_eq!(r.get("reporter"), Some(&json!("band1reporter")));
            assert_eq!(r.get("validator"), Some(&json!("bandvaloper1a")));
        }
        assert!(state.reporters("bandvaloper1a").is_empty());
    }

    #[test]
    fn resolve_event_updates_request_without_tx_hash() {
        let mut state = oracle_state();
        let id = request(&mut state, "r");
        state.set_result(
            id,
            OracleResult {
                client_id: "r".into(),
                request_time: 1_700_000_006,
                resolve_time: 1_700_000_009,
                resolve_status: ResolveStatus::Success,
                ans_count: 4,
                result: vec![1, 2],
            },
        );
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let handled = projector
            .project_end_block(
                &state,
                &mut out,
                &block(3),
                &[
                    Event::new("transfer", [("amount", "1uband")]),
                    Event::new(EVENT_RESOLVE, [(ATTR_ID, id.to_string())]),
                ],
            )
            .unwrap();
        assert_eq!(handled, 1);
        assert_eq!(kinds(&out), vec![RecordKind::UpdateRequest]);
        assert_eq!(out[0].get("resolve_status"), Some(&json!(1)));
        assert_eq!(out[0].get("result"), Some(&json!("0102")));
        assert_eq!(out[0].get("tx_hash"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn resolving_unknown_request_is_fatal() {
        let state = oracle_state();
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let err = projector
            .project_end_block(&state, &mut out, &block(3), &[Event::new(EVENT_RESOLVE, [(ATTR_ID, "99")])])
            .unwrap_err();
        assert!(matches!(err, ProjectionError::MissingEntity { .. }));
    }

    #[test]
    fn deactivate_event_appends_history() {
        let mut state = oracle_state();
        state.set_validator_status("bandvaloper1b", ValidatorStatus { is_active: false, since: t(9) });
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        projector
            .project_end_block(
                &state,
                &mut out,
                &block(3),
                &[Event::new(EVENT_DEACTIVATE, [(ATTR_VALIDATOR, "bandvaloper1b")])],
            )
            .unwrap();
        assert_eq!(
            kinds(&out),
            vec![RecordKind::UpdateValidatorStatus, RecordKind::SetHistoricalValidatorStatus]
        );
        assert_eq!(out[1].get("status"), Some(&json!(false)));
    }

    #[test]
    fn report_must_come_from_requested_validator() {
        let mut state = oracle_state();
        let id = request(&mut state, "r");
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let tx = tx(
            0x09,
            vec![Msg::ReportData(MsgReportData {
                request_id: id,
                raw_reports: vec![],
                validator: "bandvaloper1zzz".into(),
                reporter: "band1r".into(),
            })],
            vec![],
        );
        let err = projector.project_tx(&state, &mut out, &block(3), &tx).unwrap_err();
        assert!(matches!(err, ProjectionError::MissingEntity { entity: "requested validator", .. }));
    }

    #[test]
    fn bootstrap_orders_sub_records_after_request() {
        let mut state = oracle_state();
        let resolved = request(&mut state, "done");
        let open = request(&mut state, "pending");
        state.add_report(
            resolved,
            Report {
                validator: "bandvaloper1a".into(),
                raw_reports: vec![RawReport { external_id: 1, exit_code: 0, data: b"1".to_vec() }],
            },
        );
        state.set_result(
            resolved,
            OracleResult {
                client_id: "done".into(),
                request_time: 1,
                resolve_time: 2,
                resolve_status: ResolveStatus::Expired,
                ans_count: 1,
                result: vec![],
            },
        );
        let projector = ProjectorBuilder::new().gov(false).validators(false).build();
        let mut out: Vec<Record> = Vec::new();

        let stats = projector.bootstrap(&state, &mut out, &block(10)).unwrap();

        assert_eq!(stats.data_sources, 2);
        assert_eq!(stats.oracle_scripts, 1);
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.results, 1);
        assert_eq!(stats.reports, 1);
        assert_eq!(stats.records, out.len());

        // Registry first: SET + zero counter per entity.
        assert_eq!(
            kinds(&out[..6]),
            vec![
                RecordKind::SetDataSource,
                RecordKind::NewDataSourceRequest,
                RecordKind::SetDataSource,
                RecordKind::NewDataSourceRequest,
                RecordKind::SetOracleScript,
                RecordKind::NewOracleScriptRequest,
            ]
        );
        assert!(out.iter().all(|r| r.get("tx_hash").map_or(true, |h| h.is_null())));

        let position = |kind: RecordKind, id: u64| {
            out.iter()
                .position(|r| {
                    r.kind == kind
                        && (r.get("id") == Some(&json!(id)) || r.get("request_id") == Some(&json!(id)))
                })
                .unwrap()
        };
        let new_req = position(RecordKind::NewRequest, resolved);
        assert!(new_req < position(RecordKind::NewRawRequest, resolved));
        assert!(new_req < position(RecordKind::UpdateRequest, resolved));
        assert!(position(RecordKind::UpdateRequest, resolved) < position(RecordKind::NewReport, resolved));

        let updates: Vec<_> = out
            .iter()
            .filter(|r| r.kind == RecordKind::UpdateRequest)
            .collect();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].get("id"), Some(&json!(resolved)));
        assert!(out
            .iter()
            .filter(|r| r.kind == RecordKind::NewRequest)
            .any(|r| r.get("id") == Some(&json!(open))));
    }

    #[test]
    fn bootstrap_includes_validators_and_reporters() {
        let mut state = oracle_state();
        state.set_validator_status("bandvaloper1a", ValidatorStatus { is_active: true, since: t(1) });
        state.add_reporter("bandvaloper1a", "band1rep");
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let stats = projector.bootstrap(&state, &mut out, &block(10)).unwrap();
        assert_eq!(stats.validators, 4);
        let statuses = out.iter().filter(|r| r.kind == RecordKind::UpdateValidatorStatus).count();
        assert_eq!(statuses, 1);
        assert!(out.iter().any(|r| r.kind == RecordKind::SetReporter
            && r.get("reporter") == Some(&json!("band1rep"))));
    }

    #[test]
    fn project_block_counts_records() {
        let mut state = oracle_state();
        let id = request(&mut state, "b");
        let projector = Projector::new(ProjectorConfig::default());
        let mut out: Vec<Record> = Vec::new();
        let mut failed = tx(0x0b, vec![request_msg("nope")], vec![]);
        failed.success = false;
        let stats = projector
            .project_block(
                &state,
                &mut out,
                &block(2),
                &[
                    tx(0x0a, vec![request_msg("b")], vec![Event::new(EVENT_REQUEST, [(ATTR_ID, id.to_string())])]),
                    failed,
                ],
                &[],
            )
            .unwrap();
        assert_eq!(stats.txs, 2);
        assert_eq!(stats.failed_txs, 1);
        assert_eq!(stats.records, out.len());
    }
}
