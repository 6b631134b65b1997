//! Index writer trait and the channel drain loop.

use async_trait::async_trait;
use chainproject_core::Record;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::IndexError;

/// A downstream index that consumes the record stream in order.
#[async_trait]
pub trait IndexWriter: Send + Sync {
    /// Apply one record.
    async fn apply(&self, record: &Record) -> Result<(), IndexError>;

    /// Apply records in order, stopping at the first error.
    async fn apply_batch(&self, records: &[Record]) -> Result<(), IndexError> {
        for record in records {
            self.apply(record).await?;
        }
        Ok(())
    }
}

/// Apply everything received on `rx` until every sender is dropped.
///
/// Returns the number of records applied.
pub async fn drain(
    mut rx: UnboundedReceiver<Record>,
    writer: &dyn IndexWriter,
) -> Result<usize, IndexError> {
    let mut applied = 0;
    while let Some(record) = rx.recv().await {
        writer.apply(&record).await?;
        applied += 1;
    }
    tracing::debug!(applied, "Record channel drained");
    Ok(applied)
}
