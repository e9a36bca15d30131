//! Wire and index types shared by every chanvault crate.
//!
//! - [`messages`]: the remote message/attachment schema returned by the
//!   channel API.
//! - [`index`]: the catalog snapshot persisted in the channel.
//! - [`name_codec`]: the reversible filename transform used for index keys
//!   and attachment names.

pub mod constants;
pub mod error;
pub mod index;
pub mod messages;
pub mod name_codec;

// Re-export primary types for convenience.
pub use constants::{DEFAULT_INDEX_NAME, MAX_CHUNK_SIZE};
pub use error::ParseError;
pub use index::{Catalog, ChunkRef, FileRecord};
pub use messages::{Attachment, RemoteMessage};
pub use name_codec::{decode_name, encode_name};
