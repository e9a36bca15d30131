use std::path::PathBuf;

use chanvault_channel::ChannelError;
use chanvault_protocol::ParseError;
use chanvault_transfer::TransferError;

/// Errors produced by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("catalog error: {0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid file id: {0:?}")]
    InvalidId(String),

    #[error("file id #{id} is out of range ({count} files stored)")]
    IdOutOfRange { id: usize, count: usize },

    #[error("refusing to upload empty file: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("record {0:?} vanished from the catalog")]
    MissingRecord(String),

    #[error("stored name is not a safe file name: {0:?}")]
    UnsafeName(String),
}

impl From<walkdir::Error> for CatalogError {
    fn from(e: walkdir::Error) -> Self {
        CatalogError::Io(e.into())
    }
}
