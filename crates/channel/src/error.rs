//! Channel error types and their failure classes.

use chanvault_protocol::ParseError;

/// Errors produced by channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid token")]
    InvalidToken,

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Failure class used by callers to pick a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeouts, connection failures, rate limits and 5xx responses.
    Transient,
    /// The referenced message or attachment does not exist.
    NotFound,
    /// Malformed responses, rejected requests, bad credentials.
    Invalid,
}

impl ChannelError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::Http(e) => match e.status() {
                Some(status) => status_kind(status.as_u16()),
                None if e.is_decode() || e.is_builder() => ErrorKind::Invalid,
                None => ErrorKind::Transient,
            },
            ChannelError::Api { status, .. } => status_kind(*status),
            ChannelError::Parse(_)
            | ChannelError::InvalidToken
            | ChannelError::MissingCredential(_) => ErrorKind::Invalid,
        }
    }

    /// Returns `true` for 404-style failures.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

fn status_kind(status: u16) -> ErrorKind {
    match status {
        404 => ErrorKind::NotFound,
        408 | 429 | 500..=599 => ErrorKind::Transient,
        _ => ErrorKind::Invalid,
    }
}
