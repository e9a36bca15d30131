use chanvault_protocol::FileRecord;
use tracing::{info, warn};

use crate::ChunkEngine;
use crate::progress::{TransferKind, TransferProgress};

/// Result of deleting one chunk message.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted {
        index: usize,
        message_id: String,
    },
    Failed {
        index: usize,
        message_id: String,
        reason: String,
    },
}

impl DeleteOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, DeleteOutcome::Failed { .. })
    }
}

/// Per-chunk result of deleting a chunk set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteReport {
    pub outcomes: Vec<DeleteOutcome>,
}

impl DeleteReport {
    /// Returns `true` only if every chunk message was deleted.
    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.iter().any(DeleteOutcome::is_failed)
    }

    /// Number of chunk messages that could not be deleted.
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }
}

impl ChunkEngine<'_> {
    /// Deletes every chunk message of `record`, one at a time.
    ///
    /// Failures do not stop the loop; the report says which chunks remain.
    pub async fn delete_chunks(&self, record: &FileRecord) -> DeleteReport {
        let name = record.decoded_name();
        let total = record.chunk_refs.len();
        let mut report = DeleteReport::default();

        for (index, chunk_ref) in record.chunk_refs.iter().enumerate() {
            if index > 0 && !self.config.delete_pacing.is_zero() {
                tokio::time::sleep(self.config.delete_pacing).await;
            }

            let message_id = chunk_ref.message_id.clone();
            let outcome = match self.channel.delete_message(&message_id).await {
                Ok(()) => DeleteOutcome::Deleted { index, message_id },
                Err(e) => {
                    warn!(
                        name = %name,
                        chunk = index + 1,
                        total,
                        message_id = %message_id,
                        error = %e,
                        "failed to delete chunk"
                    );
                    DeleteOutcome::Failed {
                        index,
                        message_id,
                        reason: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);

            self.report(TransferProgress {
                kind: TransferKind::Delete,
                name: name.clone(),
                chunk: index + 1,
                total_chunks: total,
                bytes: 0,
                total_bytes: 0,
            });
        }

        if report.all_succeeded() {
            info!(name = %name, chunks = total, "chunks deleted");
        }
        report
    }
}
