//! Core Settings struct and implementations.

use super::{FilterRules, PlatformBucket, SIGNED_SYSTEMS};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Content digest used for the per-bucket manifest.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5, 32 hex characters, manifest `md5sums`
    #[default]
    Md5,
    /// SHA-256, 64 hex characters, manifest `sha256sums`
    Sha256,
}

impl DigestAlgorithm {
    /// File name of the manifest written into every bucket directory.
    pub fn manifest_name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5sums",
            DigestAlgorithm::Sha256 => "sha256sums",
        }
    }

    /// Length of the hex digest.
    pub fn hex_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 32,
            DigestAlgorithm::Sha256 => 64,
        }
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            other => Err(format!("Unknown digest algorithm: {other} (expected md5 or sha256)")),
        }
    }
}

/// Settings for one invocation.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder), which validates
/// the base URL and concurrency.
///
/// # Examples
///
/// ```
/// use ci_release_unpack::settings::SettingsBuilder;
///
/// let settings = SettingsBuilder::new()
///     .base_url("https://ci.example.org:8443")
///     .project_id("XRootD")
///     .build()
///     .unwrap();
/// assert_eq!(settings.project_id(), "XRootD");
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// CI server root, e.g. `https://teamcity-dss.cern.ch:8443`.
    base_url: Url,

    /// CI project whose build types are listed.
    project_id: String,

    /// GPG identity handed to the package signer.
    signing_identity: String,

    /// Whether signing-designated buckets are re-signed.
    sign_packages: bool,

    digest: DigestAlgorithm,

    connect_timeout: Duration,

    /// Upper bound for a single metadata request.
    request_timeout: Duration,

    /// Abort the archive download after this long without data.
    download_inactivity_timeout: Duration,

    /// Number of build detail documents fetched at once while resolving tags.
    concurrency: usize,

    filter: FilterRules,

    buckets: Vec<PlatformBucket>,

    /// Parent of the per-run scratch directory; the system temp dir if unset.
    scratch_root: Option<PathBuf>,
}

impl Settings {
    /// Returns the CI server root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the CI project id.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns the signing identity.
    pub fn signing_identity(&self) -> &str {
        &self.signing_identity
    }

    /// Returns true if signing is enabled.
    pub fn sign_packages(&self) -> bool {
        self.sign_packages
    }

    /// Returns the manifest digest algorithm.
    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    /// Returns the TCP connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per-request timeout for metadata documents.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the download inactivity timeout.
    pub fn download_inactivity_timeout(&self) -> Duration {
        self.download_inactivity_timeout
    }

    /// Returns the tag-fetch concurrency (always at least 1).
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the classification rules.
    pub fn filter(&self) -> &FilterRules {
        &self.filter
    }

    /// Returns the bucket table.
    pub fn buckets(&self) -> &[PlatformBucket] {
        &self.buckets
    }

    /// Directory the scratch directory is created in, if overridden.
    pub fn scratch_root(&self) -> Option<&Path> {
        self.scratch_root.as_deref()
    }

    /// True if packages in `bucket` must be signed before checksumming.
    pub fn requires_signing(&self, bucket: &PlatformBucket) -> bool {
        self.sign_packages && SIGNED_SYSTEMS.contains(&bucket.system.as_str())
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        base_url: Url,
        project_id: String,
        signing_identity: String,
        sign_packages: bool,
        digest: DigestAlgorithm,
        timeouts: (Duration, Duration, Duration),
        concurrency: usize,
        filter: FilterRules,
        buckets: Vec<PlatformBucket>,
        scratch_root: Option<PathBuf>,
    ) -> Self {
        let (connect_timeout, request_timeout, download_inactivity_timeout) = timeouts;
        Self {
            base_url,
            project_id,
            signing_identity,
            sign_packages,
            digest,
            connect_timeout,
            request_timeout,
            download_inactivity_timeout,
            concurrency,
            filter,
            buckets,
            scratch_root,
        }
    }
}
