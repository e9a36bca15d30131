//! Chunked file transfer over a storage channel.
//!
//! A file is split into fixed-size chunks, each posted as one attachment
//! named `<encoded name>.<index>`. [`ChunkEngine`] uploads, downloads and
//! deletes such chunk sets and reports per-chunk outcomes so callers can
//! tell a complete transfer from a partial one.

mod chunked;
mod delete;
mod download;
mod progress;
mod retry;
mod upload;

use std::time::Duration;

use chanvault_channel::{ChannelApi, ChannelError};
use chanvault_protocol::MAX_CHUNK_SIZE;

pub use chunked::{ChunkReader, chunk_attachment_name, is_chunk_attachment_name, total_chunks};
pub use delete::{DeleteOutcome, DeleteReport};
pub use download::{ChunkOutcome, DownloadReport};
pub use progress::{ProgressCallback, ProgressReporter, TransferKind, TransferProgress};
pub use retry::{RetryPolicy, write_with_retry};
pub use upload::UploadedChunks;

/// Default chunk size, the largest attachment the channel accepts.
pub const DEFAULT_CHUNK_SIZE: usize = MAX_CHUNK_SIZE;

/// Default pause between consecutive message deletes.
pub const DEFAULT_DELETE_PACING: Duration = Duration::from_secs(1);

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to upload chunk {chunk} of {total}: {source}", chunk = .index + 1)]
    ChunkUpload {
        index: usize,
        total: usize,
        #[source]
        source: ChannelError,
    },

    #[error("source size changed while uploading: expected {expected} bytes, read {read}")]
    SizeChanged { expected: u64, read: u64 },
}

/// Tuning for chunk transfers.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Bytes per chunk. Every chunk but the last is exactly this long.
    pub chunk_size: usize,
    /// Retry budget for local writes while downloading.
    pub write_retry: RetryPolicy,
    /// Pause between message deletes, to stay under rate limits.
    pub delete_pacing: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            write_retry: RetryPolicy::default(),
            delete_pacing: DEFAULT_DELETE_PACING,
        }
    }
}

/// Runs chunk transfers against one channel.
///
/// The engine never touches the catalog; callers decide what to record
/// based on the returned reports.
pub struct ChunkEngine<'a> {
    channel: &'a dyn ChannelApi,
    config: &'a TransferConfig,
    progress: Option<&'a ProgressReporter>,
}

impl<'a> ChunkEngine<'a> {
    pub fn new(channel: &'a dyn ChannelApi, config: &'a TransferConfig) -> Self {
        Self {
            channel,
            config,
            progress: None,
        }
    }

    /// Attaches a progress reporter notified after every chunk.
    pub fn with_progress(mut self, progress: &'a ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, progress: TransferProgress) {
        if let Some(reporter) = self.progress {
            reporter.notify(&progress);
        }
    }
}
