//! Channel API client for chanvault.
//!
//! The store only needs five remote capabilities, captured by
//! [`ChannelApi`]: post an attachment, list recent messages, fetch a
//! message, delete a message and stream an attachment body.
//! [`HttpChannel`] implements them over the platform's REST API; the
//! `test-util` feature adds an in-memory implementation with fault
//! injection for tests.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export primary types for convenience.
pub use api::{AttachmentStream, ChannelApi, ChannelFuture, read_attachment};
pub use config::ChannelConfig;
pub use error::{ChannelError, ErrorKind};
pub use http::HttpChannel;
