use std::sync::RwLock;

/// Which operation a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Upload,
    Download,
    Delete,
}

/// Snapshot of a running chunk transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    pub kind: TransferKind,
    /// Plain filename being transferred.
    pub name: String,
    /// Chunks finished so far (or the chunk in flight, on download).
    pub chunk: usize,
    pub total_chunks: usize,
    /// Bytes moved so far.
    pub bytes: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Completion percentage, by bytes when known, else by chunks.
    pub fn percent(&self) -> f64 {
        if self.total_bytes > 0 {
            (self.bytes as f64 / self.total_bytes as f64 * 100.0).min(100.0)
        } else if self.total_chunks > 0 {
            (self.chunk as f64 / self.total_chunks as f64 * 100.0).min(100.0)
        } else {
            100.0
        }
    }
}

/// Callback invoked with transfer progress.
pub type ProgressCallback = Box<dyn Fn(&TransferProgress) + Send + Sync>;

/// Fans progress updates out to registered callbacks.
#[derive(Default)]
pub struct ProgressReporter {
    callbacks: RwLock<Vec<ProgressCallback>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a progress callback.
    pub fn on_progress(&self, callback: ProgressCallback) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.push(callback);
        }
    }

    /// Sends one update to every callback.
    pub fn notify(&self, progress: &TransferProgress) {
        if let Ok(callbacks) = self.callbacks.read() {
            for cb in callbacks.iter() {
                cb(progress);
            }
        }
    }
}
