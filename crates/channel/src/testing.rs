//! In-memory channel for tests.
//!
//! Available behind the `test-util` feature or in `#[cfg(test)]` within
//! chanvault-channel. [`MemoryChannel`] keeps messages in insertion order,
//! hands out sequential ids and can be told to fail specific calls, which
//! is how partial-failure behaviour is exercised without a network.

use std::collections::HashSet;
use std::sync::Mutex;

use bytes::Bytes;
use chanvault_protocol::{Attachment, RemoteMessage};
use futures_util::StreamExt;

use crate::api::{AttachmentStream, ChannelApi, ChannelFuture};
use crate::error::ChannelError;

const URL_PREFIX: &str = "mem://attachments/";

/// Default size of the pieces an attachment body is streamed in.
const DEFAULT_PIECE_SIZE: usize = 64 * 1024;

struct StoredMessage {
    id: String,
    /// `None` for plain text messages.
    attachment: Option<StoredAttachment>,
}

struct StoredAttachment {
    id: String,
    filename: String,
    data: Bytes,
}

impl StoredMessage {
    fn to_remote(&self) -> RemoteMessage {
        RemoteMessage {
            id: self.id.clone(),
            attachments: self
                .attachment
                .iter()
                .map(|a| Attachment {
                    id: a.id.clone(),
                    filename: a.filename.clone(),
                    size: a.data.len() as u64,
                    url: format!("{URL_PREFIX}{}/{}", a.id, a.filename),
                })
                .collect(),
        }
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    messages: Vec<StoredMessage>,
    posts: usize,
    deletes: usize,
    fail_posts_from: Option<usize>,
    fail_post_names: HashSet<String>,
    fail_deletes: HashSet<String>,
    fail_gets: HashSet<String>,
    fail_opens: HashSet<String>,
    expired: HashSet<String>,
    fail_listing: bool,
    piece_size: Option<usize>,
}

impl State {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{}", 1000 + self.next_id)
    }

    fn position(&self, message_id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == message_id)
    }
}

fn injected(status: u16, what: &str) -> ChannelError {
    ChannelError::Api {
        status,
        body: format!("injected failure: {what}"),
    }
}

/// Channel implementation backed by a `Vec` of messages.
#[derive(Default)]
pub struct MemoryChannel {
    state: Mutex<State>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    // -- seeding ------------------------------------------------------------

    /// Adds a message with one attachment, bypassing fault injection.
    pub fn seed_attachment(&self, filename: &str, data: &[u8]) -> RemoteMessage {
        let mut s = self.state.lock().unwrap();
        let id = s.next_id();
        let attachment_id = s.next_id();
        let msg = StoredMessage {
            id,
            attachment: Some(StoredAttachment {
                id: attachment_id,
                filename: filename.to_string(),
                data: Bytes::copy_from_slice(data),
            }),
        };
        let remote = msg.to_remote();
        s.messages.push(msg);
        remote
    }

    /// Adds a message without attachments.
    pub fn seed_text(&self) -> String {
        let mut s = self.state.lock().unwrap();
        let id = s.next_id();
        s.messages.push(StoredMessage {
            id: id.clone(),
            attachment: None,
        });
        id
    }

    // -- fault injection ----------------------------------------------------

    /// Fails the `n`-th post (0-based, counted from channel creation) and
    /// every post after it.
    pub fn fail_posts_from(&self, n: usize) {
        self.state.lock().unwrap().fail_posts_from = Some(n);
    }

    /// Fails every post of an attachment with this filename.
    pub fn fail_posts_named(&self, filename: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_post_names
            .insert(filename.to_string());
    }

    /// Fails deletes of this message.
    pub fn fail_delete(&self, message_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_deletes
            .insert(message_id.to_string());
    }

    /// Fails lookups of this message with a 500.
    pub fn fail_get(&self, message_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_gets
            .insert(message_id.to_string());
    }

    /// Fails opening the attachment held by this message.
    pub fn fail_open(&self, message_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_opens
            .insert(message_id.to_string());
    }

    /// Makes the attachment body of this message answer 404, as an
    /// expired or purged upload would.
    pub fn expire_attachment(&self, message_id: &str) {
        self.state
            .lock()
            .unwrap()
            .expired
            .insert(message_id.to_string());
    }

    /// Fails message listings with a 503.
    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }

    /// Clears all injected failures.
    pub fn heal(&self) {
        let mut s = self.state.lock().unwrap();
        s.fail_posts_from = None;
        s.fail_post_names.clear();
        s.fail_deletes.clear();
        s.fail_gets.clear();
        s.fail_opens.clear();
        s.fail_listing = false;
    }

    /// Sets the size of streamed attachment pieces.
    pub fn set_piece_size(&self, size: usize) {
        self.state.lock().unwrap().piece_size = Some(size.max(1));
    }

    // -- inspection ---------------------------------------------------------

    /// Ids of all live messages, oldest first.
    pub fn message_ids(&self) -> Vec<String> {
        let s = self.state.lock().unwrap();
        s.messages.iter().map(|m| m.id.clone()).collect()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.state.lock().unwrap().position(message_id).is_some()
    }

    /// Attachment body held by a message.
    pub fn attachment_data(&self, message_id: &str) -> Option<Vec<u8>> {
        let s = self.state.lock().unwrap();
        let idx = s.position(message_id)?;
        s.messages[idx]
            .attachment
            .as_ref()
            .map(|a| a.data.to_vec())
    }

    /// Attachment filenames of all live messages, oldest first.
    pub fn attachment_names(&self) -> Vec<String> {
        let s = self.state.lock().unwrap();
        s.messages
            .iter()
            .filter_map(|m| m.attachment.as_ref().map(|a| a.filename.clone()))
            .collect()
    }

    /// Number of live messages.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of post attempts, failed ones included.
    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts
    }

    /// Number of delete attempts, failed ones included.
    pub fn delete_count(&self) -> usize {
        self.state.lock().unwrap().deletes
    }
}

impl ChannelApi for MemoryChannel {
    fn post_attachment(&self, filename: &str, data: Vec<u8>) -> ChannelFuture<'_, RemoteMessage> {
        let filename = filename.to_string();
        Box::pin(async move {
            let mut s = self.state.lock().unwrap();
            let attempt = s.posts;
            s.posts += 1;

            let from_failed = s.fail_posts_from.is_some_and(|n| attempt >= n);
            if from_failed || s.fail_post_names.contains(&filename) {
                return Err(injected(500, &format!("post {filename}")));
            }

            let id = s.next_id();
            let attachment_id = s.next_id();
            let msg = StoredMessage {
                id,
                attachment: Some(StoredAttachment {
                    id: attachment_id,
                    filename,
                    data: Bytes::from(data),
                }),
            };
            let remote = msg.to_remote();
            s.messages.push(msg);
            Ok(remote)
        })
    }

    fn recent_messages(&self, limit: u8) -> ChannelFuture<'_, Vec<RemoteMessage>> {
        Box::pin(async move {
            let s = self.state.lock().unwrap();
            if s.fail_listing {
                return Err(injected(503, "listing"));
            }
            Ok(s.messages
                .iter()
                .rev()
                .take(limit as usize)
                .map(StoredMessage::to_remote)
                .collect())
        })
    }

    fn get_message(&self, message_id: &str) -> ChannelFuture<'_, RemoteMessage> {
        let message_id = message_id.to_string();
        Box::pin(async move {
            let s = self.state.lock().unwrap();
            if s.fail_gets.contains(&message_id) {
                return Err(injected(500, &format!("get {message_id}")));
            }
            let idx = s
                .position(&message_id)
                .ok_or_else(|| injected(404, &format!("unknown message {message_id}")))?;
            Ok(s.messages[idx].to_remote())
        })
    }

    fn delete_message(&self, message_id: &str) -> ChannelFuture<'_, ()> {
        let message_id = message_id.to_string();
        Box::pin(async move {
            let mut s = self.state.lock().unwrap();
            s.deletes += 1;
            if s.fail_deletes.contains(&message_id) {
                return Err(injected(500, &format!("delete {message_id}")));
            }
            let idx = s
                .position(&message_id)
                .ok_or_else(|| injected(404, &format!("unknown message {message_id}")))?;
            s.messages.remove(idx);
            Ok(())
        })
    }

    fn open_attachment(&self, url: &str) -> ChannelFuture<'_, AttachmentStream> {
        let url = url.to_string();
        Box::pin(async move {
            let s = self.state.lock().unwrap();
            let attachment_id = url
                .strip_prefix(URL_PREFIX)
                .and_then(|rest| rest.split('/').next())
                .ok_or_else(|| injected(400, &format!("bad url {url}")))?;

            let msg = s
                .messages
                .iter()
                .find(|m| m.attachment.as_ref().is_some_and(|a| a.id == attachment_id))
                .ok_or_else(|| injected(404, &format!("unknown attachment {attachment_id}")))?;
            if s.fail_opens.contains(&msg.id) {
                return Err(injected(500, &format!("open {}", msg.id)));
            }
            if s.expired.contains(&msg.id) {
                return Err(injected(404, &format!("expired {}", msg.id)));
            }

            let data = msg
                .attachment
                .as_ref()
                .map(|a| a.data.clone())
                .unwrap_or_default();
            let piece_size = s.piece_size.unwrap_or(DEFAULT_PIECE_SIZE);
            let pieces: Vec<Result<Bytes, ChannelError>> = (0..data.len())
                .step_by(piece_size)
                .map(|start| Ok(data.slice(start..(start + piece_size).min(data.len()))))
                .collect();
            Ok(futures_util::stream::iter(pieces).boxed())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::read_attachment;

    #[tokio::test]
    async fn post_then_read_back() {
        let channel = MemoryChannel::new();
        let msg = channel
            .post_attachment("a.bin", b"hello world".to_vec())
            .await
            .unwrap();
        let att = msg.sole_attachment().unwrap();
        assert_eq!(att.filename, "a.bin");
        assert_eq!(att.size, 11);

        channel.set_piece_size(4);
        let body = read_attachment(&channel, &att.url).await.unwrap();
        assert_eq!(body, b"hello world");
    }

    #[tokio::test]
    async fn recent_messages_newest_first() {
        let channel = MemoryChannel::new();
        let first = channel.seed_attachment("one", b"1");
        let second = channel.seed_text();

        let recent = channel.recent_messages(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second);
        assert_eq!(recent[1].id, first.id);

        let latest = channel.recent_messages(1).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert!(latest[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_and_reports_unknown() {
        let channel = MemoryChannel::new();
        let msg = channel.seed_attachment("x", b"x");
        channel.delete_message(&msg.id).await.unwrap();
        assert!(!channel.contains(&msg.id));

        let err = channel.delete_message(&msg.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(channel.delete_count(), 2);
    }

    #[tokio::test]
    async fn injected_failures() {
        let channel = MemoryChannel::new();
        let msg = channel.seed_attachment("x", b"x");

        channel.fail_delete(&msg.id);
        assert!(channel.delete_message(&msg.id).await.is_err());
        assert!(channel.contains(&msg.id));

        channel.fail_posts_named("index.txt");
        assert!(channel.post_attachment("index.txt", vec![]).await.is_err());
        assert!(channel.post_attachment("other", vec![]).await.is_ok());

        channel.fail_posts_from(3);
        assert!(channel.post_attachment("late", vec![]).await.is_err());

        channel.heal();
        assert!(channel.post_attachment("index.txt", vec![]).await.is_ok());
        channel.delete_message(&msg.id).await.unwrap();
    }

    #[tokio::test]
    async fn empty_attachment_streams_nothing() {
        let channel = MemoryChannel::new();
        let msg = channel.seed_attachment("empty", b"");
        let url = &msg.first_attachment().unwrap().url;
        let body = read_attachment(&channel, url).await.unwrap();
        assert!(body.is_empty());
    }
}
