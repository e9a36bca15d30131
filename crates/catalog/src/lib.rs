//! Catalog storage and file operations for chanvault.
//!
//! The catalog maps encoded filenames to their chunk locations and lives
//! in the channel itself as a JSON snapshot attachment. [`IndexStore`]
//! reads and replaces that snapshot; [`FileCatalog`] builds the user-facing
//! operations (list, find, upload, download, delete) on top of it and the
//! chunk transfer engine.

pub mod archive;
pub mod config;
pub mod error;
pub mod index_store;
pub mod operations;
pub mod selector;
pub mod types;

// Re-export primary types for convenience.
pub use config::StoreConfig;
pub use error::CatalogError;
pub use index_store::{IndexStore, Snapshot};
pub use operations::FileCatalog;
pub use selector::parse_id;
pub use types::{
    CatalogEntry, DeleteResult, DownloadResult, DownloadStatus, Listing, UploadResult,
    Verification,
};
