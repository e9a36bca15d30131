use std::path::PathBuf;

use chanvault_transfer::{DeleteReport, DownloadReport};

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// 1-based position in the catalog.
    pub id: usize,
    /// Plain filename.
    pub name: String,
    pub size: u64,
}

/// Catalog contents in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub entries: Vec<CatalogEntry>,
    /// Sum of all stored file sizes, not just the listed ones.
    pub total_size: u64,
}

/// Outcome of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Uploaded {
        name: String,
        size: u64,
        chunks: usize,
    },
    /// A file with this name is already stored; nothing was uploaded.
    AlreadyPresent { name: String },
}

/// How a downloaded file compares with its catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Size and checksum match.
    Verified,
    SizeMismatch { expected: u64, actual: u64 },
    ChecksumMismatch { expected: String, actual: String },
    /// Size matches; the record carries no checksum to compare.
    Unverified,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        matches!(self, Verification::Verified | Verification::Unverified)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Complete,
    /// Chunks were skipped or the result failed verification.
    Incomplete,
}

/// Outcome of downloading one file.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub id: usize,
    pub name: String,
    pub path: PathBuf,
    pub report: DownloadReport,
    pub verification: Verification,
}

impl DownloadResult {
    pub fn status(&self) -> DownloadStatus {
        if self.report.is_complete() && self.verification.is_ok() {
            DownloadStatus::Complete
        } else {
            DownloadStatus::Incomplete
        }
    }
}

/// Outcome of a delete.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteResult {
    /// Every chunk is gone and the record was removed.
    Deleted { name: String, chunks: usize },
    /// Some chunk messages survived; the record was kept.
    PartiallyDeleted { name: String, report: DeleteReport },
}
