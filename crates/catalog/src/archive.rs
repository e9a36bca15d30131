//! Directory archiving for upload.
//!
//! A directory is stored as a single deflated zip. Entries are sorted and
//! stamped with a fixed time so the same tree always yields the same bytes.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::DateTime;
use zip::write::SimpleFileOptions;

use crate::error::CatalogError;

/// Name of the archive built for `dir`: `<dirname>.zip`.
pub fn archive_name(dir: &Path) -> Result<String, CatalogError> {
    let name = dir
        .file_name()
        .ok_or_else(|| CatalogError::InvalidPath(dir.to_path_buf()))?;
    Ok(format!("{}.zip", name.to_string_lossy()))
}

/// Zips `dir` into `staging_dir/<dirname>.zip`, replacing any previous
/// archive of the same name. Returns the archive path.
pub fn zip_directory(dir: &Path, staging_dir: &Path) -> Result<PathBuf, CatalogError> {
    let source = dir.canonicalize()?;
    if !source.is_dir() {
        return Err(CatalogError::InvalidPath(dir.to_path_buf()));
    }
    let dest = staging_dir.join(archive_name(&source)?);
    std::fs::create_dir_all(staging_dir)?;

    let fixed_time = DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(fixed_time);

    // (relative path with '/' separators, is_dir)
    let mut entries = Vec::new();
    for entry in WalkDir::new(&source).min_depth(1).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(&source)
            .map_err(|_| CatalogError::InvalidPath(entry.path().to_path_buf()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let file_type = entry.file_type();
        if file_type.is_dir() || file_type.is_file() {
            entries.push((name, file_type.is_dir()));
        }
    }
    entries.sort();

    let file = std::fs::File::create(&dest)?;
    let mut zip = zip::ZipWriter::new(file);
    for (name, is_dir) in &entries {
        if *is_dir {
            zip.add_directory(name.as_str(), options)?;
        } else {
            zip.start_file(name.as_str(), options)?;
            let mut f = std::fs::File::open(source.join(name))?;
            std::io::copy(&mut f, &mut zip)?;
        }
    }
    zip.finish()?.flush()?;

    debug!(dir = %source.display(), archive = %dest.display(), entries = entries.len(), "directory archived");
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn sample_tree(root: &Path) -> PathBuf {
        let dir = root.join("photos");
        std::fs::create_dir_all(dir.join("2024/summer")).unwrap();
        std::fs::create_dir_all(dir.join("empty")).unwrap();
        std::fs::write(dir.join("b.txt"), b"bee").unwrap();
        std::fs::write(dir.join("a.txt"), b"ay").unwrap();
        std::fs::write(dir.join("2024/summer/beach.jpg"), b"sand").unwrap();
        dir
    }

    #[test]
    fn archive_name_uses_directory_name() {
        assert_eq!(archive_name(Path::new("/home/u/photos")).unwrap(), "photos.zip");
        assert!(archive_name(Path::new("/")).is_err());
    }

    #[test]
    fn zips_tree_with_sorted_entries() {
        let tmp = TempDir::new().unwrap();
        let dir = sample_tree(tmp.path());
        let staging = tmp.path().join("staging");

        let archive = zip_directory(&dir, &staging).unwrap();
        assert_eq!(archive, staging.join("photos.zip"));

        let mut zip = zip::ZipArchive::new(std::fs::File::open(&archive).unwrap()).unwrap();
        let names: Vec<String> = zip.file_names().map(String::from).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 6);
        assert!(names.contains(&"2024/summer/beach.jpg".to_string()));
        assert!(names.contains(&"empty/".to_string()));

        let mut body = String::new();
        zip.by_name("2024/summer/beach.jpg")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "sand");
    }

    #[test]
    fn output_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let dir = sample_tree(tmp.path());

        let first = std::fs::read(zip_directory(&dir, &tmp.path().join("one")).unwrap()).unwrap();
        let second = std::fs::read(zip_directory(&dir, &tmp.path().join("two")).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_plain_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            zip_directory(&file, tmp.path()),
            Err(CatalogError::InvalidPath(_))
        ));
    }
}
