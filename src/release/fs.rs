//! File system utilities for the unpack pipeline.
//!
//! Directory listings are returned in the host's iteration order; nothing
//! here sorts.

use crate::error::{ErrorExt, OperationError};
use std::io;
use std::path::Path;
use tokio::fs;

/// Names of the entries of `dir`, in directory iteration order.
pub async fn list_entry_names(dir: &Path) -> Result<Vec<String>, OperationError> {
    let mut entries = fs::read_dir(dir).await.fs_context("listing", dir)?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.fs_context("listing", dir)? {
        let name = entry.file_name().into_string().map_err(|raw| OperationError::Io {
            context: "decoding entry name in".to_string(),
            path: dir.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                format!("non UTF-8 file name {raw:?}"),
            ),
        })?;
        names.push(name);
    }

    Ok(names)
}

/// Names of the regular files directly inside `dir`, in iteration order.
pub async fn list_file_names(dir: &Path) -> Result<Vec<String>, OperationError> {
    let mut files = Vec::new();
    for name in list_entry_names(dir).await? {
        let path = dir.join(&name);
        let metadata = fs::metadata(&path).await.fs_context("inspecting", &path)?;
        if metadata.is_file() {
            files.push(name);
        }
    }
    Ok(files)
}

/// Creates a bucket output directory that must not exist yet.
///
/// Parents are created as needed; the leaf directory itself is created with
/// a non-recursive `create_dir`, so a directory left by an earlier run fails
/// with [`OperationError::BucketExists`] instead of being merged into.
pub async fn create_fresh_dir(path: &Path) -> Result<(), OperationError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating", parent)?;
    }

    match fs::create_dir(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(OperationError::BucketExists {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e).fs_context("creating", path),
    }
}

/// Copies a regular file from one path to another.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64, OperationError> {
    let metadata = fs::metadata(from).await.fs_context("reading", from)?;
    if !metadata.is_file() {
        return Err(OperationError::Io {
            context: "copying".to_string(),
            path: from.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    fs::copy(from, to).await.fs_context("copying to", to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_dir_refuses_existing() {
        let root = tempfile::tempdir().unwrap();
        let bucket = root.path().join("slc6").join("x86_64");

        create_fresh_dir(&bucket).await.unwrap();
        assert!(bucket.is_dir());

        let err = create_fresh_dir(&bucket).await.unwrap_err();
        assert!(matches!(err, OperationError::BucketExists { .. }));
    }

    #[tokio::test]
    async fn file_listing_skips_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.rpm"), b"a").unwrap();
        std::fs::create_dir(root.path().join("logs")).unwrap();

        let mut all = list_entry_names(root.path()).await.unwrap();
        all.sort();
        assert_eq!(all, vec!["a.rpm", "logs"]);
        assert_eq!(list_file_names(root.path()).await.unwrap(), vec!["a.rpm"]);
    }

    #[tokio::test]
    async fn copy_rejects_directories() {
        let root = tempfile::tempdir().unwrap();
        let err = copy_file(root.path(), &root.path().join("x")).await.unwrap_err();
        assert!(matches!(err, OperationError::Io { .. }));
    }
}
