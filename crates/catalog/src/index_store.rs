//! Catalog snapshot persistence.
//!
//! The catalog is stored as a JSON attachment in the channel. Every
//! mutation posts a fresh snapshot and only then deletes the previous one,
//! so an interrupted update leaves a stale snapshot behind, never none.

use chanvault_channel::{ChannelApi, read_attachment};
use chanvault_protocol::{Catalog, RemoteMessage};
use chanvault_transfer::is_chunk_attachment_name;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::CatalogError;

/// A catalog together with the message holding it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Message id of the snapshot, `None` if the store has none yet.
    pub remote_id: Option<String>,
    pub catalog: Catalog,
}

/// Reads and replaces catalog snapshots in a channel.
pub struct IndexStore<'a> {
    channel: &'a dyn ChannelApi,
    config: &'a StoreConfig,
}

impl<'a> IndexStore<'a> {
    pub fn new(channel: &'a dyn ChannelApi, config: &'a StoreConfig) -> Self {
        Self { channel, config }
    }

    /// Fetches the current snapshot.
    ///
    /// An uninitialised store, a missing snapshot body or an unreadable
    /// one all yield an empty catalog without a remote id, so the next
    /// write leaves the old message in place. Other channel failures are
    /// errors.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, CatalogError> {
        let recent = self
            .channel
            .recent_messages(self.config.scan_limit())
            .await?;

        let Some(latest) = recent.first() else {
            info!("channel is empty, starting with an empty catalog");
            return Ok(Snapshot::default());
        };
        if latest.attachments.is_empty() {
            warn!(
                message_id = %latest.id,
                "latest message has no attachment, starting with an empty catalog"
            );
            return Ok(Snapshot::default());
        }

        let found = recent
            .iter()
            .find(|m| self.is_snapshot(m))
            .or_else(|| recent.iter().find(|m| is_unnamed_snapshot(m)));
        let Some(message) = found else {
            info!(
                scanned = recent.len(),
                index_name = %self.config.index_name,
                "no catalog snapshot found, starting with an empty catalog"
            );
            return Ok(Snapshot::default());
        };

        let attachment = message.sole_attachment()?;
        if attachment.filename != self.config.index_name {
            info!(
                message_id = %message.id,
                filename = %attachment.filename,
                "reading catalog snapshot stored under another name"
            );
        }
        let body = match read_attachment(self.channel, &attachment.url).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                warn!(message_id = %message.id, "catalog snapshot body is gone, using an empty catalog");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        match Catalog::from_slice(&body) {
            Ok(catalog) => {
                debug!(message_id = %message.id, files = catalog.len(), "catalog snapshot loaded");
                Ok(Snapshot {
                    remote_id: Some(message.id.clone()),
                    catalog,
                })
            }
            Err(e) => {
                warn!(
                    message_id = %message.id,
                    error = %e,
                    "unreadable catalog snapshot, using an empty catalog and keeping the message"
                );
                Ok(Snapshot::default())
            }
        }
    }

    /// Posts `catalog` as the new snapshot, then deletes `previous`.
    ///
    /// Returns the new snapshot's message id. Nothing is deleted if the
    /// post fails; a failed delete only orphans the old snapshot.
    pub async fn write_snapshot(
        &self,
        previous: Option<&str>,
        catalog: &Catalog,
    ) -> Result<String, CatalogError> {
        let body = catalog.to_vec()?;
        let posted = self
            .channel
            .post_attachment(&self.config.index_name, body)
            .await?;
        debug!(message_id = %posted.id, files = catalog.len(), "catalog snapshot written");

        if let Some(previous) = previous {
            if let Err(e) = self.channel.delete_message(previous).await {
                warn!(message_id = %previous, error = %e, "failed to delete previous catalog snapshot");
            }
        }
        Ok(posted.id)
    }

    fn is_snapshot(&self, message: &RemoteMessage) -> bool {
        message
            .sole_attachment()
            .is_ok_and(|a| a.filename == self.config.index_name)
    }
}

/// Older clients posted the snapshot without choosing a name, so the
/// platform assigned one. Any single attachment that is not a chunk
/// qualifies.
fn is_unnamed_snapshot(message: &RemoteMessage) -> bool {
    message
        .sole_attachment()
        .is_ok_and(|a| !is_chunk_attachment_name(&a.filename))
}
