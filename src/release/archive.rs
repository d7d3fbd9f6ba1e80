//! Artifact bundle extraction.
//!
//! The CI server delivers every artifact of a build as one zip container.
//! Entries are written below the destination directory with their internal
//! relative paths; intermediate directories are created as needed. Entries
//! whose path would escape the destination are rejected.

use crate::error::{ErrorExt, OperationError};
use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Extract the zip file at `archive_path` into `dest_dir`.
///
/// Runs on the blocking pool. Returns the number of files written.
///
/// # Errors
///
/// [`OperationError::Archive`] if the file is not a valid zip container or an
/// entry is unsafe, [`OperationError::Io`] if an entry cannot be written. A
/// failed extraction leaves already written entries in place.
pub async fn extract_file(archive_path: &Path, dest_dir: &Path) -> Result<usize, OperationError> {
    let archive = archive_path.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = File::open(&archive).fs_context("opening archive", &archive)?;
        extract(file, &archive, &dest_dir)
    })
    .await
    .map_err(|e| OperationError::Archive {
        archive: archive_path.to_path_buf(),
        reason: format!("extraction task panicked: {e}"),
    })?
}

/// Extract an in-memory zip container into `dest_dir`.
pub fn extract_bytes(bytes: &[u8], dest_dir: &Path) -> Result<usize, OperationError> {
    extract(io::Cursor::new(bytes), Path::new("<memory>"), dest_dir)
}

fn extract<R: Read + Seek>(
    reader: R,
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<usize, OperationError> {
    let invalid = |reason: String| OperationError::Archive {
        archive: archive_path.to_path_buf(),
        reason,
    };

    let mut archive = ZipArchive::new(reader).map_err(|e| invalid(e.to_string()))?;
    fs::create_dir_all(dest_dir).fs_context("creating", dest_dir)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| invalid(format!("entry {i}: {e}")))?;
        let relative_path = entry
            .enclosed_name()
            .ok_or_else(|| invalid(format!("unsafe entry path {}", entry.name())))?;
        let absolute_path = dest_dir.join(&relative_path);

        if entry.is_dir() {
            fs::create_dir_all(&absolute_path).fs_context("creating", &absolute_path)?;
            continue;
        }

        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent).fs_context("creating", parent)?;
        }

        let mut outfile = File::create(&absolute_path).fs_context("creating", &absolute_path)?;
        io::copy(&mut entry, &mut outfile).fs_context("extracting", &absolute_path)?;
        written += 1;
    }

    log::debug!(
        "Extracted {} file(s) from {} into {}",
        written,
        archive_path.display(),
        dest_dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn bundle(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn preserves_relative_paths() {
        let dest = tempfile::tempdir().unwrap();
        let data = bundle(&[
            ("slc-6-x86_64/pkg-1.rpm", b"rpm"),
            ("slc-6-x86_64/logs/build.log", b"log"),
        ]);

        assert_eq!(extract_bytes(&data, dest.path()).unwrap(), 2);
        assert_eq!(
            fs::read(dest.path().join("slc-6-x86_64/pkg-1.rpm")).unwrap(),
            b"rpm"
        );
        assert!(dest.path().join("slc-6-x86_64/logs").is_dir());
    }

    #[test]
    fn rejects_non_zip_bytes() {
        let dest = tempfile::tempdir().unwrap();
        let err = extract_bytes(b"<html>not found</html>", dest.path()).unwrap_err();
        assert!(matches!(err, OperationError::Archive { .. }));
    }

    #[test]
    fn rejects_escaping_entries() {
        let dest = tempfile::tempdir().unwrap();
        let data = bundle(&[("../evil.rpm", b"x")]);
        let err = extract_bytes(&data, dest.path()).unwrap_err();
        assert!(matches!(err, OperationError::Archive { .. }));
    }

    #[tokio::test]
    async fn extracts_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("artifacts.zip");
        fs::write(&archive, bundle(&[("a/b.txt", b"b")])).unwrap();

        let out = dir.path().join("out");
        assert_eq!(extract_file(&archive, &out).await.unwrap(), 1);
        assert!(out.join("a/b.txt").is_file());
    }
}
