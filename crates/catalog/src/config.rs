use std::path::PathBuf;

use chanvault_protocol::DEFAULT_INDEX_NAME;

/// Default number of recent messages searched for the catalog snapshot.
pub const DEFAULT_SNAPSHOT_SCAN_LIMIT: u8 = 50;

/// Catalog storage settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Attachment name of the catalog snapshot.
    pub index_name: String,
    /// How many recent messages to search for the snapshot (1-100).
    pub snapshot_scan_limit: u8,
    /// Where directory archives are built before upload.
    pub staging_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.into(),
            snapshot_scan_limit: DEFAULT_SNAPSHOT_SCAN_LIMIT,
            staging_dir: std::env::temp_dir().join("chanvault"),
        }
    }
}

impl StoreConfig {
    /// Scan limit clamped to what the channel API accepts.
    pub fn scan_limit(&self) -> u8 {
        self.snapshot_scan_limit.clamp(1, 100)
    }
}
