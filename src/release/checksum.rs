//! Per-directory checksum manifests.
//!
//! Each bucket directory gets a manifest with one `<hex digest> <filename>`
//! line per regular file, in directory listing order. Files are hashed in
//! 8KB chunks.

use super::fs::list_file_names;
use crate::error::{ErrorExt, OperationError};
use crate::settings::DigestAlgorithm;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const CHUNK_SIZE: usize = 8192;

/// One manifest line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManifestEntry {
    /// Hex-encoded digest
    pub digest: String,
    /// File name relative to the manifest's directory
    pub file_name: String,
}

/// Incremental digest over either supported algorithm.
enum Hasher {
    Md5(md5::Context),
    Sha256(Sha256),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            DigestAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(ctx) => ctx.consume(data),
            Hasher::Sha256(hasher) => hasher.update(data),
        }
    }

    fn finish(self) -> String {
        match self {
            Hasher::Md5(ctx) => format!("{:x}", ctx.compute()),
            Hasher::Sha256(hasher) => format!("{:x}", hasher.finalize()),
        }
    }
}

/// Calculates the hex digest of a single file.
///
/// Reads the file in 8KB chunks so large packages are never held in memory.
///
/// # Errors
///
/// [`OperationError::Io`] if the file cannot be opened or read.
pub async fn calculate_file_digest(
    file_path: &Path,
    algorithm: DigestAlgorithm,
) -> Result<String, OperationError> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finish())
}

/// Hash every regular file in `dir` (no recursion) and write the manifest to `dest_file`.
///
/// The listing is taken before `dest_file` is created, so a manifest written
/// into `dir` itself never lists itself.
///
/// # Returns
///
/// The entries written, in file order.
pub async fn write_manifest(
    dir: &Path,
    dest_file: &Path,
    algorithm: DigestAlgorithm,
) -> Result<Vec<ManifestEntry>, OperationError> {
    let manifest_name = dest_file.file_name().map(|n| n.to_string_lossy().into_owned());
    let in_same_dir = dest_file.parent() == Some(dir);

    let mut entries = Vec::new();
    for file_name in list_file_names(dir).await? {
        if in_same_dir && manifest_name.as_deref() == Some(file_name.as_str()) {
            continue;
        }
        let digest = calculate_file_digest(&dir.join(&file_name), algorithm).await?;
        entries.push(ManifestEntry { digest, file_name });
    }

    let mut contents = String::new();
    for entry in &entries {
        contents.push_str(&entry.digest);
        contents.push(' ');
        contents.push_str(&entry.file_name);
        contents.push('\n');
    }

    let mut file = tokio::fs::File::create(dest_file)
        .await
        .fs_context("creating manifest", dest_file)?;
    file.write_all(contents.as_bytes())
        .await
        .fs_context("writing manifest", dest_file)?;
    file.flush().await.fs_context("writing manifest", dest_file)?;

    log::debug!(
        "Wrote {} entries to {}",
        entries.len(),
        dest_file.display()
    );
    Ok(entries)
}

/// Path of the manifest for a bucket directory.
pub fn manifest_path(dir: &Path, algorithm: DigestAlgorithm) -> PathBuf {
    dir.join(algorithm.manifest_name())
}

/// Parse manifest text back into entries.
pub fn parse_manifest(contents: &str) -> Vec<ManifestEntry> {
    contents
        .lines()
        .filter_map(|line| line.split_once(' '))
        .map(|(digest, file_name)| ManifestEntry {
            digest: digest.to_string(),
            file_name: file_name.to_string(),
        })
        .collect()
}
