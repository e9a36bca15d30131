/// Largest attachment the remote store accepts, and therefore the chunk size.
///
/// Decimal megabytes: the platform limit is 25 MB, not 25 MiB.
pub const MAX_CHUNK_SIZE: usize = 25 * 1000 * 1000;

/// Attachment name used for catalog snapshots.
pub const DEFAULT_INDEX_NAME: &str = "index.txt";

/// Status code the remote API returns for a successful delete.
pub const DELETE_SUCCESS_STATUS: u16 = 204;
