//! User-facing catalog operations.
//!
//! Every operation starts from a freshly fetched snapshot. Mutations write
//! a new snapshot only after the chunk transfer they depend on succeeded,
//! so the catalog never references chunks that were not stored.

use std::path::{Component, Path, PathBuf};

use chanvault_channel::ChannelApi;
use chanvault_protocol::{FileRecord, encode_name};
use chanvault_transfer::{ChunkEngine, ProgressReporter, TransferConfig};
use tracing::{info, warn};

use crate::archive::{archive_name, zip_directory};
use crate::config::StoreConfig;
use crate::error::CatalogError;
use crate::index_store::{IndexStore, Snapshot};
use crate::selector::{Selected, resolve};
use crate::types::{
    CatalogEntry, DeleteResult, DownloadResult, Listing, UploadResult, Verification,
};

/// List, find, upload, download and delete files stored in a channel.
pub struct FileCatalog<'a> {
    channel: &'a dyn ChannelApi,
    store: &'a StoreConfig,
    transfer: &'a TransferConfig,
    progress: Option<&'a ProgressReporter>,
}

impl<'a> FileCatalog<'a> {
    pub fn new(
        channel: &'a dyn ChannelApi,
        store: &'a StoreConfig,
        transfer: &'a TransferConfig,
    ) -> Self {
        Self {
            channel,
            store,
            transfer,
            progress: None,
        }
    }

    /// Attaches a progress reporter to chunk transfers.
    pub fn with_progress(mut self, progress: &'a ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    fn index(&self) -> IndexStore<'a> {
        IndexStore::new(self.channel, self.store)
    }

    fn engine(&self) -> ChunkEngine<'a> {
        let engine = ChunkEngine::new(self.channel, self.transfer);
        match self.progress {
            Some(progress) => engine.with_progress(progress),
            None => engine,
        }
    }

    /// Lists every stored file with its id.
    pub async fn list(&self) -> Result<Listing, CatalogError> {
        let snapshot = self.index().fetch_snapshot().await?;
        let entries = snapshot
            .catalog
            .iter()
            .enumerate()
            .map(|(offset, record)| CatalogEntry {
                id: offset + 1,
                name: record.decoded_name(),
                size: record.size,
            })
            .collect();
        Ok(Listing {
            entries,
            total_size: snapshot.catalog.total_size(),
        })
    }

    /// Lists files whose name contains `term`, ignoring case.
    ///
    /// Ids stay those of the full listing.
    pub async fn find(&self, term: &str) -> Result<Listing, CatalogError> {
        let mut listing = self.list().await?;
        let needle = term.to_lowercase();
        listing
            .entries
            .retain(|entry| entry.name.to_lowercase().contains(&needle));
        Ok(listing)
    }

    /// Uploads a file, or a directory as `<dirname>.zip`.
    ///
    /// A name that is already stored is left alone and reported as
    /// [`UploadResult::AlreadyPresent`].
    pub async fn upload(&self, path: &Path) -> Result<UploadResult, CatalogError> {
        let meta = tokio::fs::metadata(path).await?;
        let is_dir = meta.is_dir();
        let name = if is_dir {
            archive_name(&path.canonicalize()?)?
        } else {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| CatalogError::InvalidPath(path.to_path_buf()))?
        };
        if !is_dir && meta.len() == 0 {
            return Err(CatalogError::EmptyFile(path.to_path_buf()));
        }

        let snapshot = self.index().fetch_snapshot().await?;
        let encoded = encode_name(&name);
        if snapshot.catalog.contains(&encoded) {
            info!(name = %name, "file already stored, skipping upload");
            return Ok(UploadResult::AlreadyPresent { name });
        }

        let (source, staged) = if is_dir {
            let dir = path.to_path_buf();
            let staging = self.store.staging_dir.clone();
            let archive = tokio::task::spawn_blocking(move || zip_directory(&dir, &staging))
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))??;
            (archive.clone(), Some(archive))
        } else {
            (path.to_path_buf(), None)
        };

        let result = self.upload_source(&source, name, encoded, snapshot).await;

        if let Some(archive) = staged {
            if let Err(e) = tokio::fs::remove_file(&archive).await {
                warn!(archive = %archive.display(), error = %e, "failed to remove staged archive");
            }
        }
        result
    }

    async fn upload_source(
        &self,
        source: &Path,
        name: String,
        encoded: String,
        snapshot: Snapshot,
    ) -> Result<UploadResult, CatalogError> {
        let size = tokio::fs::metadata(source).await?.len();
        if size == 0 {
            return Err(CatalogError::EmptyFile(source.to_path_buf()));
        }

        let file = tokio::fs::File::open(source).await?;
        let uploaded = self.engine().upload_chunks(file, &encoded, size).await?;
        let chunks = uploaded.refs.len();

        let mut catalog = snapshot.catalog;
        catalog.insert(FileRecord {
            encoded_name: encoded,
            size,
            chunk_refs: uploaded.refs,
            sha256: Some(uploaded.sha256),
        })?;
        self.index()
            .write_snapshot(snapshot.remote_id.as_deref(), &catalog)
            .await?;

        info!(name = %name, size, chunks, "file stored");
        Ok(UploadResult::Uploaded { name, size, chunks })
    }

    /// Downloads the selected files into `dest_dir`.
    ///
    /// Every selector is resolved before anything is transferred; one bad
    /// selector fails the whole batch. Files with skipped chunks are still
    /// written and come back with an incomplete status.
    pub async fn download(
        &self,
        selectors: &[String],
        dest_dir: &Path,
    ) -> Result<Vec<DownloadResult>, CatalogError> {
        let snapshot = self.index().fetch_snapshot().await?;

        let mut planned = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let Selected { id, record, .. } = resolve(&snapshot.catalog, selector)?;
            let name = record.decoded_name();
            let path = dest_dir.join(safe_file_name(&name)?);
            planned.push((id, name, path, record));
        }

        tokio::fs::create_dir_all(dest_dir).await?;

        let engine = self.engine();
        let mut results = Vec::with_capacity(planned.len());
        for (id, name, path, record) in planned {
            let mut file = tokio::fs::File::create(&path).await?;
            let report = engine.download_chunks(record, &mut file).await?;
            let verification = verify(record, report.bytes_written, &report.sha256);
            if !verification.is_ok() {
                warn!(name = %name, ?verification, "downloaded file failed verification");
            }
            results.push(DownloadResult {
                id,
                name,
                path,
                report,
                verification,
            });
        }
        Ok(results)
    }

    /// Deletes the selected file's chunks, then its record.
    ///
    /// If any chunk message survives the record is kept so the file can
    /// still be found and the delete retried.
    pub async fn delete(&self, selector: &str) -> Result<DeleteResult, CatalogError> {
        let snapshot = self.index().fetch_snapshot().await?;
        let Selected { id, key, record } = resolve(&snapshot.catalog, selector)?;
        let key = key.to_string();
        let name = record.decoded_name();
        let chunks = record.chunk_refs.len();

        let report = self.engine().delete_chunks(record).await;
        if !report.all_succeeded() {
            warn!(
                name = %name,
                id,
                failed = report.failed_count(),
                chunks,
                "file partially deleted, keeping its record"
            );
            return Ok(DeleteResult::PartiallyDeleted { name, report });
        }

        let mut catalog = snapshot.catalog;
        if catalog.remove(&key).is_none() {
            return Err(CatalogError::MissingRecord(key));
        }
        self.index()
            .write_snapshot(snapshot.remote_id.as_deref(), &catalog)
            .await?;

        info!(name = %name, id, chunks, "file deleted");
        Ok(DeleteResult::Deleted { name, chunks })
    }
}

/// Accepts a stored name only if it is a single plain path component.
fn safe_file_name(name: &str) -> Result<&Path, CatalogError> {
    let path = Path::new(name);
    let mut components = path.components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains(['/', '\\']) {
        return Err(CatalogError::UnsafeName(name.to_string()));
    }
    Ok(path)
}

fn verify(record: &FileRecord, bytes_written: u64, sha256: &str) -> Verification {
    if bytes_written != record.size {
        return Verification::SizeMismatch {
            expected: record.size,
            actual: bytes_written,
        };
    }
    match &record.sha256 {
        Some(expected) if expected.eq_ignore_ascii_case(sha256) => Verification::Verified,
        Some(expected) => Verification::ChecksumMismatch {
            expected: expected.clone(),
            actual: sha256.to_string(),
        },
        None => Verification::Unverified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanvault_protocol::ChunkRef;

    fn record(size: u64, sha256: Option<&str>) -> FileRecord {
        FileRecord {
            encoded_name: "n".into(),
            size,
            chunk_refs: vec![ChunkRef::new("m", "a")],
            sha256: sha256.map(String::from),
        }
    }

    #[test]
    fn safe_names() {
        assert!(safe_file_name("report.pdf").is_ok());
        assert!(safe_file_name("My File (1).txt").is_ok());
        assert!(safe_file_name(".hidden").is_ok());
    }

    #[test]
    fn unsafe_names() {
        for bad in ["", ".", "..", "../x", "a/b", "/etc/passwd", "a\\b"] {
            assert!(
                matches!(safe_file_name(bad), Err(CatalogError::UnsafeName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn verification_outcomes() {
        assert_eq!(verify(&record(3, Some("ABC")), 3, "abc"), Verification::Verified);
        assert_eq!(verify(&record(3, None), 3, "abc"), Verification::Unverified);
        assert_eq!(
            verify(&record(3, Some("abc")), 2, "abc"),
            Verification::SizeMismatch {
                expected: 3,
                actual: 2
            }
        );
        assert!(matches!(
            verify(&record(3, Some("abc")), 3, "def"),
            Verification::ChecksumMismatch { .. }
        ));
    }
}
