//! In-memory index backend.
//!
//! Applies records the way a database-backed consumer would: `NEW_*` rows
//! are inserted once, `SET_*`/`UPDATE_*` merge into the row keyed by the
//! record's id fields, history entries append, counters increment,
//! `REMOVE_*` deletes. All data is lost when the process exits.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use chainproject_core::sink::Payload;
use chainproject_core::types::ResolveStatus;
use chainproject_core::{Record, RecordSemantics};
use serde_json::Value;

use crate::error::IndexError;
use crate::writer::IndexWriter;

/// Rows of one table, keyed by [`Record::key`].
pub type Table = BTreeMap<String, Payload>;

/// Fields describing where a row came from rather than what it is.
pub const PROVENANCE_FIELDS: &[&str] = &["tx_hash", "sender", "reporter"];

/// In-memory downstream index.
#[derive(Default)]
pub struct InMemoryIndex {
    tables: Mutex<BTreeMap<String, Table>>,
    applied: Mutex<usize>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record synchronously.
    pub fn apply_record(&self, record: &Record) -> Result<(), IndexError> {
        let key = record.key();
        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(record.kind.table().to_string()).or_default();

        match record.kind.semantics() {
            RecordSemantics::Insert => {
                if table.contains_key(&key) {
                    return Err(IndexError::Duplicate {
                        kind: record.kind,
                        key,
                    });
                }
                table.insert(key, record.payload.clone());
            }
            RecordSemantics::Upsert => match table.get_mut(&key) {
                Some(row) => {
                    check_resolve_status(&key, row, &record.payload)?;
                    merge(row, &record.payload);
                }
                None => {
                    table.insert(key, record.payload.clone());
                }
            },
            RecordSemantics::Append => {
                let seq = table
                    .keys()
                    .filter(|k| history_key_matches(k, &key))
                    .count();
                table.insert(format!("{key}#{seq}"), record.payload.clone());
            }
            RecordSemantics::Increment => {
                let row = table.entry(key).or_insert_with(|| record.payload.clone());
                let count = row.get("count").and_then(Value::as_u64).unwrap_or(0);
                row.insert("count".into(), Value::from(count + 1));
            }
            RecordSemantics::Remove => {
                table.remove(&key);
            }
        }

        *self.applied.lock().unwrap() += 1;
        Ok(())
    }

    /// A single row.
    pub fn row(&self, table: &str, key: &str) -> Option<Payload> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|t| t.get(key))
            .cloned()
    }

    /// Every row of `table`.
    pub fn table(&self, table: &str) -> Table {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Counter value of a row maintained by increment records.
    pub fn counter(&self, table: &str, key: &str) -> Option<u64> {
        self.row(table, key)
            .and_then(|row| row.get("count").and_then(Value::as_u64))
    }

    /// Rows of `tables` with provenance fields stripped, for comparing two indexes.
    pub fn snapshot(&self, tables: &[&str]) -> BTreeMap<String, Table> {
        tables
            .iter()
            .map(|name| {
                let rows = self
                    .table(name)
                    .into_iter()
                    .map(|(key, mut row)| {
                        for field in PROVENANCE_FIELDS {
                            row.remove(*field);
                        }
                        (key, row)
                    })
                    .collect();
                (name.to_string(), rows)
            })
            .collect()
    }

    /// Total number of records applied.
    pub fn applied(&self) -> usize {
        *self.applied.lock().unwrap()
    }
}

/// Whether `row_key` is an appended entry (`<key>#<seq>`) under `key`.
fn history_key_matches(row_key: &str, key: &str) -> bool {
    row_key
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix('#'))
        .is_some_and(|seq| seq.bytes().all(|b| b.is_ascii_digit()))
}

/// Merge `payload` into `row`. The row keeps the `tx_hash` of the record
/// that created it.
fn merge(row: &mut Payload, payload: &Payload) {
    for (field, value) in payload {
        if field == "tx_hash" && row.contains_key("tx_hash") {
            continue;
        }
        row.insert(field.clone(), value.clone());
    }
}

fn check_resolve_status(key: &str, row: &Payload, payload: &Payload) -> Result<(), IndexError> {
    let (Some(from), Some(to)) = (
        row.get("resolve_status").and_then(Value::as_u64),
        payload.get("resolve_status").and_then(Value::as_u64),
    ) else {
        return Ok(());
    };
    let ok = match (ResolveStatus::from_code(from), ResolveStatus::from_code(to)) {
        (Some(a), Some(b)) => a.can_transition_to(b),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(IndexError::StatusRegression {
            key: key.to_string(),
            from,
            to,
        })
    }
}

#[async_trait]
impl IndexWriter for InMemoryIndex {
    async fn apply(&self, record: &Record) -> Result<(), IndexError> {
        self.apply_record(record)
    }
}
