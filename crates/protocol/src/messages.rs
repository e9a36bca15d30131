use serde::{Deserialize, Serialize};

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Remote message schema
// ---------------------------------------------------------------------------

/// A file attached to a remote message.
///
/// `url` is a signed download link that may expire; callers re-resolve it
/// through the owning message instead of persisting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

/// A channel message as returned by the remote API.
///
/// Only the fields the store relies on are modelled. `id` is required;
/// a message without an `attachments` array is treated as having none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub id: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl RemoteMessage {
    /// Decodes a single message from a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decodes a newest-first message listing from a response body.
    pub fn list_from_slice(body: &[u8]) -> Result<Vec<Self>, ParseError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Returns the first attachment, as the store posts exactly one per message.
    pub fn first_attachment(&self) -> Result<&Attachment, ParseError> {
        self.attachments
            .first()
            .ok_or_else(|| ParseError::NoAttachment {
                message_id: self.id.clone(),
            })
    }

    /// Returns the only attachment, failing if there are none or several.
    pub fn sole_attachment(&self) -> Result<&Attachment, ParseError> {
        match self.attachments.as_slice() {
            [only] => Ok(only),
            [] => Err(ParseError::NoAttachment {
                message_id: self.id.clone(),
            }),
            many => Err(ParseError::AttachmentCount {
                message_id: self.id.clone(),
                expected: 1,
                found: many.len(),
            }),
        }
    }

    /// Finds an attachment by id.
    pub fn attachment(&self, attachment_id: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == attachment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTED: &str = r#"{
        "id": "1200000000000000001",
        "channel_id": "99",
        "content": "",
        "attachments": [{
            "id": "1200000000000000002",
            "filename": "ercbeg.cqs.0",
            "size": 25000000,
            "url": "https://cdn.example.com/attachments/99/1/ercbeg.cqs.0?ex=1",
            "proxy_url": "https://media.example.com/x"
        }]
    }"#;

    #[test]
    fn parses_posted_message_ignoring_extra_fields() {
        let msg = RemoteMessage::from_slice(POSTED.as_bytes()).unwrap();
        assert_eq!(msg.id, "1200000000000000001");
        let att = msg.sole_attachment().unwrap();
        assert_eq!(att.id, "1200000000000000002");
        assert_eq!(att.filename, "ercbeg.cqs.0");
        assert_eq!(att.size, 25_000_000);
    }

    #[test]
    fn missing_id_is_parse_error() {
        let result = RemoteMessage::from_slice(br#"{"attachments": []}"#);
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[test]
    fn attachment_missing_url_is_parse_error() {
        let body = br#"{"id": "1", "attachments": [{"id": "2", "filename": "a"}]}"#;
        assert!(RemoteMessage::from_slice(body).is_err());
    }

    #[test]
    fn missing_attachments_defaults_to_empty() {
        let msg = RemoteMessage::from_slice(br#"{"id": "7", "content": "hi"}"#).unwrap();
        assert!(msg.attachments.is_empty());
        assert!(matches!(
            msg.first_attachment(),
            Err(ParseError::NoAttachment { .. })
        ));
    }

    #[test]
    fn sole_attachment_rejects_multiple() {
        let att = Attachment {
            id: "a".into(),
            filename: "f".into(),
            size: 1,
            url: "u".into(),
        };
        let msg = RemoteMessage {
            id: "m".into(),
            attachments: vec![att.clone(), att],
        };
        match msg.sole_attachment() {
            Err(ParseError::AttachmentCount { found, .. }) => assert_eq!(found, 2),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(msg.first_attachment().is_ok());
    }

    #[test]
    fn parses_listing_newest_first() {
        let body = br#"[{"id": "3", "attachments": []}, {"id": "2"}]"#;
        let list = RemoteMessage::list_from_slice(body).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "3");
    }

    #[test]
    fn attachment_lookup_by_id() {
        let msg = RemoteMessage::from_slice(POSTED.as_bytes()).unwrap();
        assert!(msg.attachment("1200000000000000002").is_some());
        assert!(msg.attachment("nope").is_none());
    }
}
