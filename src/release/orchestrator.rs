//! End-to-end release unpacking.
//!
//! This module provides the [`ReleaseUnpacker`] that drives one `unpack`
//! invocation: resolve the tag, download the bundle into a private scratch
//! directory, extract it, then materialize every bucket of the static table
//! (classify, copy, sign where designated, write the manifest).

use super::archive::extract_file;
use super::checksum::{ManifestEntry, manifest_path, write_manifest};
use super::classify::classify;
use super::fs::{copy_file, create_fresh_dir, list_file_names};
use super::signing::Signer;
use crate::ci::{CiTransport, TagResolver};
use crate::error::{ErrorExt, OperationError, Result};
use crate::settings::{PlatformBucket, Settings, UnpackRequest};
use std::path::{Path, PathBuf};
use url::Url;

/// Name of the downloaded bundle inside the scratch directory.
const ARCHIVE_FILE_NAME: &str = "artifacts.zip";
/// Extraction root inside the scratch directory.
const EXTRACT_DIR_NAME: &str = "extracted";

/// Outcome of one materialized bucket.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BucketReport {
    /// Bucket label, e.g. `slc6/x86_64`
    pub bucket: String,
    /// Output directory
    pub dir: PathBuf,
    /// Package files copied into `dir`, in copy order
    pub files: Vec<String>,
    /// Manifest path
    pub manifest: PathBuf,
    /// Whether the packages were signed before checksumming
    pub signed: bool,
}

/// Outcome of an `unpack` invocation.
#[derive(Clone, Debug, serde::Serialize)]
pub struct UnpackReport {
    pub tag: String,
    pub config_id: String,
    pub archive_url: String,
    pub archive_bytes: u64,
    pub buckets: Vec<BucketReport>,
}

/// Drives resolve → download → extract → classify → sign → checksum.
///
/// Buckets are processed one after another in table order. There is no
/// rollback: when a bucket fails, buckets finished before it stay on disk,
/// and re-running requires removing them first. The scratch directory is
/// removed on every exit path.
///
/// # Examples
///
/// ```no_run
/// use ci_release_unpack::ci::HttpTransport;
/// use ci_release_unpack::release::{ReleaseUnpacker, RpmSigner};
/// use ci_release_unpack::settings::{ConfigSelector, SettingsBuilder, UnpackRequest};
///
/// # async fn example() -> ci_release_unpack::Result<()> {
/// let settings = SettingsBuilder::new().build()?;
/// let transport = HttpTransport::new(&settings)?;
/// let signer = RpmSigner::new(settings.signing_identity());
///
/// let request = UnpackRequest::new("v4.2.0", ConfigSelector::Name("Release".into()), ".")?;
/// let report = ReleaseUnpacker::new(&transport, &signer, &settings)
///     .unpack(&request)
///     .await?;
/// println!("{} bucket(s) written", report.buckets.len());
/// # Ok(())
/// # }
/// ```
pub struct ReleaseUnpacker<'a, T: CiTransport + ?Sized, S: Signer + ?Sized> {
    transport: &'a T,
    signer: &'a S,
    settings: &'a Settings,
}

impl<T: CiTransport + ?Sized, S: Signer + ?Sized> std::fmt::Debug for ReleaseUnpacker<'_, T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseUnpacker")
            .field("settings", &self.settings)
            .finish()
    }
}

impl<'a, T: CiTransport + ?Sized, S: Signer + ?Sized> ReleaseUnpacker<'a, T, S> {
    pub fn new(transport: &'a T, signer: &'a S, settings: &'a Settings) -> Self {
        Self {
            transport,
            signer,
            settings,
        }
    }

    /// Resolve the request's tag and unpack its bundle below the output root.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError`](crate::error::ConfigurationError) if the selector
    ///   cannot be resolved
    /// - [`OperationError::TagNotFound`] if no build carries the tag; nothing
    ///   is downloaded or created in that case
    /// - any [`OperationError`] raised while downloading or processing buckets
    pub async fn unpack(&self, request: &UnpackRequest) -> Result<UnpackReport> {
        let resolver = TagResolver::new(self.transport, self.settings);
        let (config_id, tag_map) = resolver.resolve(request.selector()).await?;

        let url = tag_map
            .get(request.tag())
            .cloned()
            .ok_or_else(|| OperationError::TagNotFound {
                tag: request.tag().to_string(),
            })?;
        log::info!("Tag {} resolves to {}", request.tag(), url);

        let mut report = self.unpack_url(&url, request.output_root()).await?;
        report.tag = request.tag().to_string();
        report.config_id = config_id;
        Ok(report)
    }

    /// Download the bundle at `url` and materialize every bucket under `output_root`.
    pub async fn unpack_url(&self, url: &Url, output_root: &Path) -> Result<UnpackReport> {
        let scratch_parent = self
            .settings
            .scratch_root()
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let scratch = tempfile::Builder::new()
            .prefix("ci-release-unpack-")
            .tempdir_in(&scratch_parent)
            .fs_context("creating scratch directory in", &scratch_parent)?;
        log::debug!("Scratch directory {}", scratch.path().display());

        let archive = scratch.path().join(ARCHIVE_FILE_NAME);
        let archive_bytes = self.transport.download(url, &archive).await?;

        let extract_root = scratch.path().join(EXTRACT_DIR_NAME);
        let extracted = extract_file(&archive, &extract_root).await?;
        log::info!("Extracted {} file(s) from {}", extracted, url);

        let mut buckets = Vec::with_capacity(self.settings.buckets().len());
        for bucket in self.settings.buckets() {
            buckets.push(self.process_bucket(&extract_root, bucket, output_root).await?);
        }

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            log::warn!(
                "Failed to remove scratch directory {}: {}",
                scratch_path.display(),
                e
            );
        }

        Ok(UnpackReport {
            tag: String::new(),
            config_id: String::new(),
            archive_url: url.to_string(),
            archive_bytes,
            buckets,
        })
    }

    async fn process_bucket(
        &self,
        extract_root: &Path,
        bucket: &PlatformBucket,
        output_root: &Path,
    ) -> Result<BucketReport> {
        let dir = bucket.output_dir(output_root);
        create_fresh_dir(&dir).await?;

        let files = classify(extract_root, bucket, self.settings.filter()).await?;
        let source = bucket.source_path(extract_root);
        for name in &files {
            copy_file(&source.join(name), &dir.join(name)).await?;
        }
        log::info!("{}: copied {} package(s)", bucket, files.len());

        let signed = self.settings.requires_signing(bucket);
        if signed {
            let present: Vec<PathBuf> = list_file_names(&dir)
                .await?
                .into_iter()
                .map(|name| dir.join(name))
                .collect();
            self.signer
                .sign(&present)
                .await
                .map_err(|e| OperationError::Sign {
                    bucket: bucket.label(),
                    reason: e.to_string(),
                })?;
        }

        let manifest = manifest_path(&dir, self.settings.digest());
        let entries: Vec<ManifestEntry> =
            write_manifest(&dir, &manifest, self.settings.digest()).await?;
        log::debug!("{}: manifest has {} entries", bucket, entries.len());

        Ok(BucketReport {
            bucket: bucket.label(),
            dir,
            files,
            manifest,
            signed,
        })
    }
}
