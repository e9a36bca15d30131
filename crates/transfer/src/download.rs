use chanvault_protocol::{ChunkRef, FileRecord};
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::progress::{TransferKind, TransferProgress};
use crate::retry::write_with_retry;
use crate::{ChunkEngine, TransferError};

/// What happened to one chunk during a download.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// The chunk was fetched and written in full.
    Written { index: usize, bytes: u64 },
    /// The chunk could not be fetched or written. Bytes of it written
    /// before the failure remain in the output.
    Skipped {
        index: usize,
        message_id: String,
        reason: String,
    },
}

impl ChunkOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ChunkOutcome::Skipped { .. })
    }
}

/// Per-chunk result of a download.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    pub outcomes: Vec<ChunkOutcome>,
    /// Bytes written to the output, skipped chunks' partial bytes included.
    pub bytes_written: u64,
    /// Hex SHA-256 of the bytes written.
    pub sha256: String,
}

impl DownloadReport {
    /// Returns `true` only if every chunk was written.
    pub fn is_complete(&self) -> bool {
        !self.outcomes.iter().any(ChunkOutcome::is_skipped)
    }

    /// Chunks that were skipped, in order.
    pub fn skipped(&self) -> impl Iterator<Item = &ChunkOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }
}

enum ChunkFailure {
    Fetch(String),
    Write(std::io::Error),
}

impl ChunkEngine<'_> {
    /// Downloads the chunks of `record` in order into `writer`.
    ///
    /// Each chunk's message is fetched again to get a fresh attachment
    /// URL. A chunk that cannot be fetched, or whose write exhausts the
    /// retry budget, is recorded as skipped and the download carries on.
    /// Only a failure to flush the output is returned as an error.
    pub async fn download_chunks<W>(
        &self,
        record: &FileRecord,
        writer: &mut W,
    ) -> Result<DownloadReport, TransferError>
    where
        W: AsyncWrite + Unpin,
    {
        let name = record.decoded_name();
        let total = record.chunk_refs.len();
        let mut hasher = Sha256::new();
        let mut bytes_written = 0u64;
        let mut outcomes = Vec::with_capacity(total);

        debug!(name = %name, size = record.size, total, "downloading chunks");

        for (index, chunk_ref) in record.chunk_refs.iter().enumerate() {
            let before = bytes_written;
            let result = self
                .download_one(chunk_ref, writer, &mut hasher, &mut bytes_written, |bytes| {
                    self.report(TransferProgress {
                        kind: TransferKind::Download,
                        name: name.clone(),
                        chunk: index + 1,
                        total_chunks: total,
                        bytes,
                        total_bytes: record.size,
                    })
                })
                .await;

            let outcome = match result {
                Ok(()) => ChunkOutcome::Written {
                    index,
                    bytes: bytes_written - before,
                },
                Err(failure) => {
                    let reason = match failure {
                        ChunkFailure::Fetch(reason) => reason,
                        ChunkFailure::Write(e) => format!("write failed: {e}"),
                    };
                    warn!(
                        name = %name,
                        chunk = index + 1,
                        total,
                        message_id = %chunk_ref.message_id,
                        reason = %reason,
                        "skipping chunk"
                    );
                    ChunkOutcome::Skipped {
                        index,
                        message_id: chunk_ref.message_id.clone(),
                        reason,
                    }
                }
            };
            outcomes.push(outcome);
        }

        writer.flush().await?;

        let report = DownloadReport {
            outcomes,
            bytes_written,
            sha256: hex::encode(hasher.finalize()),
        };
        if report.is_complete() {
            info!(name = %name, bytes = bytes_written, "download complete");
        } else {
            warn!(
                name = %name,
                bytes = bytes_written,
                skipped = report.skipped().count(),
                "download incomplete"
            );
        }
        Ok(report)
    }

    async fn download_one<W, F>(
        &self,
        chunk_ref: &ChunkRef,
        writer: &mut W,
        hasher: &mut Sha256,
        bytes_written: &mut u64,
        on_piece: F,
    ) -> Result<(), ChunkFailure>
    where
        W: AsyncWrite + Unpin,
        F: Fn(u64),
    {
        let message = self
            .channel
            .get_message(&chunk_ref.message_id)
            .await
            .map_err(|e| ChunkFailure::Fetch(format!("message lookup failed: {e}")))?;

        let attachment = match message.attachment(&chunk_ref.attachment_id) {
            Some(a) => a,
            None => message
                .first_attachment()
                .map_err(|e| ChunkFailure::Fetch(e.to_string()))?,
        };

        let mut stream = self
            .channel
            .open_attachment(&attachment.url)
            .await
            .map_err(|e| ChunkFailure::Fetch(format!("attachment fetch failed: {e}")))?;

        while let Some(piece) = stream.next().await {
            let piece =
                piece.map_err(|e| ChunkFailure::Fetch(format!("attachment stream failed: {e}")))?;
            write_with_retry(writer, &piece, &self.config.write_retry)
                .await
                .map_err(ChunkFailure::Write)?;
            hasher.update(&piece);
            *bytes_written += piece.len() as u64;
            on_piece(*bytes_written);
        }
        Ok(())
    }
}
