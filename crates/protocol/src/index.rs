//! Catalog snapshot schema.
//!
//! The snapshot is a JSON object keyed by encoded filename:
//!
//! ```json
//! {"Ercbeg.cqs": {"filename": "Ercbeg.cqs", "size": 60000000,
//!                 "urls": [["1201", "1202"], ["1203", "1204"]]}}
//! ```
//!
//! Object order is preserved on both parse and serialize; it defines the
//! positional ids users select files by.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::ParseError;
use crate::name_codec::decode_name;

/// Location of one uploaded chunk: the message holding it and the
/// attachment within that message.
///
/// Serialized as a two-element array `[messageId, attachmentId]`. Older
/// snapshots may store either id as a JSON number; both forms are read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireRef", into = "(String, String)")]
pub struct ChunkRef {
    pub message_id: String,
    pub attachment_id: String,
}

impl ChunkRef {
    pub fn new(message_id: impl Into<String>, attachment_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            attachment_id: attachment_id.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snowflake {
    Text(String),
    Number(u64),
}

impl From<Snowflake> for String {
    fn from(id: Snowflake) -> Self {
        match id {
            Snowflake::Text(s) => s,
            Snowflake::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct WireRef(Snowflake, Snowflake);

impl From<WireRef> for ChunkRef {
    fn from(wire: WireRef) -> Self {
        ChunkRef::new(wire.0, wire.1)
    }
}

impl From<ChunkRef> for (String, String) {
    fn from(r: ChunkRef) -> Self {
        (r.message_id, r.attachment_id)
    }
}

/// One stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Encoded filename; also the record's key in the catalog.
    #[serde(rename = "filename")]
    pub encoded_name: String,
    /// Byte length of the original file.
    pub size: u64,
    /// Chunk locations in reassembly order.
    #[serde(rename = "urls")]
    pub chunk_refs: Vec<ChunkRef>,
    /// Hex SHA-256 of the whole file, when the uploader recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl FileRecord {
    /// Returns the plain filename.
    pub fn decoded_name(&self) -> String {
        decode_name(&self.encoded_name)
    }
}

/// Mapping from encoded filename to [`FileRecord`], in snapshot order.
///
/// Every key equals its record's `filename`; snapshots that break this are
/// rejected on parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    records: IndexMap<String, FileRecord>,
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = IndexMap::<String, FileRecord>::deserialize(deserializer)?;
        if let Some((key, record)) = records.iter().find(|(k, r)| **k != r.encoded_name) {
            return Err(de::Error::custom(format!(
                "record key {key:?} does not match its filename {:?}",
                record.encoded_name
            )));
        }
        Ok(Self { records })
    }
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a snapshot body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Serializes the catalog to its snapshot body.
    pub fn to_vec(&self) -> Result<Vec<u8>, ParseError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if a record exists under the encoded name.
    pub fn contains(&self, encoded_name: &str) -> bool {
        self.records.contains_key(encoded_name)
    }

    pub fn get(&self, encoded_name: &str) -> Option<&FileRecord> {
        self.records.get(encoded_name)
    }

    /// Returns the key and record at a 0-based position in snapshot order.
    pub fn get_index(&self, offset: usize) -> Option<(&str, &FileRecord)> {
        self.records
            .get_index(offset)
            .map(|(key, record)| (key.as_str(), record))
    }

    /// Iterates records in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    /// Adds a record at the end of the catalog.
    ///
    /// Rejects records without chunks and names already present.
    pub fn insert(&mut self, record: FileRecord) -> Result<(), ParseError> {
        if record.chunk_refs.is_empty() {
            return Err(ParseError::InvalidRecord {
                key: record.encoded_name,
                reason: "record has no chunks".into(),
            });
        }
        if self.records.contains_key(&record.encoded_name) {
            return Err(ParseError::InvalidRecord {
                key: record.encoded_name,
                reason: "name already present".into(),
            });
        }
        self.records.insert(record.encoded_name.clone(), record);
        Ok(())
    }

    /// Removes a record, keeping the order of the remaining ones.
    pub fn remove(&mut self, encoded_name: &str) -> Option<FileRecord> {
        self.records.shift_remove(encoded_name)
    }

    /// Sum of all record sizes.
    pub fn total_size(&self) -> u64 {
        self.records.values().map(|r| r.size).sum()
    }
}
