//! Remote capability trait.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use chanvault_protocol::RemoteMessage;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use crate::error::ChannelError;

/// Boxed future returned by [`ChannelApi`] methods.
pub type ChannelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ChannelError>> + Send + 'a>>;

/// Streamed attachment body.
pub type AttachmentStream = BoxStream<'static, Result<Bytes, ChannelError>>;

/// Abstract access to the storage channel.
///
/// The CLI uses [`HttpChannel`](crate::HttpChannel); tests use an in-memory
/// implementation. Using a trait keeps transfer and catalog logic decoupled
/// from transport and testable with fault injection.
pub trait ChannelApi: Send + Sync {
    /// Posts a new message carrying one attachment named `filename`.
    fn post_attachment(&self, filename: &str, data: Vec<u8>) -> ChannelFuture<'_, RemoteMessage>;

    /// Returns up to `limit` most recent messages, newest first.
    fn recent_messages(&self, limit: u8) -> ChannelFuture<'_, Vec<RemoteMessage>>;

    /// Fetches one message, with fresh attachment URLs.
    fn get_message(&self, message_id: &str) -> ChannelFuture<'_, RemoteMessage>;

    /// Deletes one message. Succeeds only on the API's "no content" status.
    fn delete_message(&self, message_id: &str) -> ChannelFuture<'_, ()>;

    /// Opens an attachment URL as a byte stream.
    fn open_attachment(&self, url: &str) -> ChannelFuture<'_, AttachmentStream>;
}

/// Reads a whole attachment into memory.
///
/// Only for small bodies such as catalog snapshots; chunks are streamed.
pub async fn read_attachment(channel: &dyn ChannelApi, url: &str) -> Result<Vec<u8>, ChannelError> {
    let mut stream = channel.open_attachment(url).await?;
    let mut body = Vec::new();
    while let Some(piece) = stream.next().await {
        body.extend_from_slice(&piece?);
    }
    Ok(body)
}
