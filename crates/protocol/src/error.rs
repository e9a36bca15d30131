//! Parse errors for remote payloads.

/// Errors produced while decoding remote messages or catalog snapshots.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message {message_id} has no attachments")]
    NoAttachment { message_id: String },

    #[error("message {message_id} carries {found} attachments, expected {expected}")]
    AttachmentCount {
        message_id: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid record {key}: {reason}")]
    InvalidRecord { key: String, reason: String },
}
