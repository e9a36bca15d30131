use chanvault_protocol::{ChunkRef, decode_name};
use tokio::io::AsyncRead;
use tracing::{debug, error, info};

use crate::chunked::{ChunkReader, chunk_attachment_name, total_chunks};
use crate::progress::{TransferKind, TransferProgress};
use crate::{ChunkEngine, TransferError};

/// Result of a successful chunk upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedChunks {
    /// Chunk locations in read order.
    pub refs: Vec<ChunkRef>,
    /// Total bytes uploaded.
    pub bytes: u64,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
}

impl ChunkEngine<'_> {
    /// Uploads `size` bytes from `reader` as chunks named after `encoded_name`.
    ///
    /// The first failed post aborts the upload. Chunks already posted stay
    /// in the channel unreferenced. The source must yield exactly `size`
    /// bytes, otherwise [`TransferError::SizeChanged`] is returned.
    pub async fn upload_chunks<R>(
        &self,
        reader: R,
        encoded_name: &str,
        size: u64,
    ) -> Result<UploadedChunks, TransferError>
    where
        R: AsyncRead + Unpin,
    {
        let chunk_size = self.config.chunk_size.max(1);
        let total = total_chunks(size, chunk_size);
        let name = decode_name(encoded_name);
        let mut reader = ChunkReader::new(reader);
        let mut refs = Vec::with_capacity(total);

        debug!(name = %name, size, total, chunk_size, "uploading chunks");

        for index in 0..total {
            let remaining = size - reader.offset();
            let want = remaining.min(chunk_size as u64) as usize;
            let data = reader.next_chunk(want).await?;
            if data.len() < want {
                return Err(TransferError::SizeChanged {
                    expected: size,
                    read: reader.offset(),
                });
            }

            let attachment_name = chunk_attachment_name(encoded_name, index);
            let posted = match self.channel.post_attachment(&attachment_name, data).await {
                Ok(msg) => msg
                    .first_attachment()
                    .map(|a| ChunkRef::new(msg.id.clone(), a.id.clone()))
                    .map_err(Into::into),
                Err(e) => Err(e),
            };
            let chunk_ref = match posted {
                Ok(r) => r,
                Err(source) => {
                    error!(
                        name = %name,
                        chunk = index + 1,
                        total,
                        orphaned = refs.len(),
                        error = %source,
                        "failed to upload chunk"
                    );
                    return Err(TransferError::ChunkUpload {
                        index,
                        total,
                        source,
                    });
                }
            };
            refs.push(chunk_ref);

            self.report(TransferProgress {
                kind: TransferKind::Upload,
                name: name.clone(),
                chunk: index + 1,
                total_chunks: total,
                bytes: reader.offset(),
                total_bytes: size,
            });
        }

        if !reader.at_end().await? {
            return Err(TransferError::SizeChanged {
                expected: size,
                read: reader.offset(),
            });
        }

        info!(name = %name, size, chunks = total, "upload complete");
        Ok(UploadedChunks {
            refs,
            bytes: size,
            sha256: reader.finish(),
        })
    }
}
