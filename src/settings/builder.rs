//! Builder for constructing Settings.

use super::{DigestAlgorithm, FilterRules, PlatformBucket, Settings, default_buckets};
use crate::error::ConfigurationError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default CI server.
pub const DEFAULT_BASE_URL: &str = "https://teamcity-dss.cern.ch:8443";
/// Default CI project.
pub const DEFAULT_PROJECT_ID: &str = "XRootD";
/// Default GPG identity used to re-sign packages.
pub const DEFAULT_SIGNING_IDENTITY: &str = "xrootd-dev@slac.stanford.edu";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300);

/// On-disk settings file (TOML). Every key is optional.
///
/// ```toml
/// base_url = "https://ci.example.org:8443"
/// project_id = "XRootD"
/// signing_identity = "release@example.org"
/// digest = "sha256"
/// concurrency = 4
///
/// [filter]
/// test_prefixes = ["xrootd4-tests", "xrootd-tests"]
/// ```
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// CI server root
    pub base_url: Option<String>,
    /// CI project id
    pub project_id: Option<String>,
    /// Signing identity
    pub signing_identity: Option<String>,
    /// Whether to sign packages
    pub sign: Option<bool>,
    /// Manifest digest
    pub digest: Option<DigestAlgorithm>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Download inactivity timeout in seconds
    pub download_inactivity_timeout_secs: Option<u64>,
    /// Tag-fetch concurrency
    pub concurrency: Option<usize>,
    /// Classification rules
    pub filter: Option<FilterRules>,
    /// Bucket table override
    pub buckets: Option<Vec<PlatformBucket>>,
    /// Parent directory for the scratch directory
    pub scratch_root: Option<PathBuf>,
}

impl SettingsFile {
    /// Read and parse a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigurationError::InvalidSetting {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;
        toml::from_str(&text).map_err(|e| ConfigurationError::InvalidSetting {
            reason: format!("Failed to parse {}: {}", path.display(), e),
        })
    }
}

/// Builder for constructing [`Settings`].
///
/// Unset fields fall back to the defaults of the original release process
/// (CERN TeamCity, `XRootD` project, MD5 manifests, sequential tag fetch).
///
/// # Examples
///
/// ```
/// use ci_release_unpack::settings::{DigestAlgorithm, SettingsBuilder};
///
/// let settings = SettingsBuilder::new()
///     .digest(DigestAlgorithm::Sha256)
///     .concurrency(4)
///     .sign_packages(false)
///     .build()
///     .unwrap();
/// assert_eq!(settings.concurrency(), 4);
/// ```
#[derive(Default, Debug)]
pub struct SettingsBuilder {
    base_url: Option<String>,
    project_id: Option<String>,
    signing_identity: Option<String>,
    sign_packages: Option<bool>,
    digest: Option<DigestAlgorithm>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    download_inactivity_timeout: Option<Duration>,
    concurrency: Option<usize>,
    filter: Option<FilterRules>,
    buckets: Option<Vec<PlatformBucket>>,
    scratch_root: Option<PathBuf>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a builder pre-populated from a settings file.
    pub fn from_file(file: SettingsFile) -> Self {
        Self {
            base_url: file.base_url,
            project_id: file.project_id,
            signing_identity: file.signing_identity,
            sign_packages: file.sign,
            digest: file.digest,
            connect_timeout: file.connect_timeout_secs.map(Duration::from_secs),
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            download_inactivity_timeout: file
                .download_inactivity_timeout_secs
                .map(Duration::from_secs),
            concurrency: file.concurrency,
            filter: file.filter,
            buckets: file.buckets,
            scratch_root: file.scratch_root,
        }
    }

    /// Sets the CI server root URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the CI project id.
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Sets the GPG identity used by the signer.
    pub fn signing_identity(mut self, identity: impl Into<String>) -> Self {
        self.signing_identity = Some(identity.into());
        self
    }

    /// Enables or disables signing.
    ///
    /// Default: enabled
    pub fn sign_packages(mut self, sign: bool) -> Self {
        self.sign_packages = Some(sign);
        self
    }

    /// Sets the manifest digest algorithm.
    ///
    /// Default: [`DigestAlgorithm::Md5`]
    pub fn digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = Some(digest);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the per-request timeout for metadata documents.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the archive download inactivity timeout.
    pub fn download_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.download_inactivity_timeout = Some(timeout);
        self
    }

    /// Sets how many build detail documents are fetched at once.
    ///
    /// Default: 1 (sequential)
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Sets the classification rules.
    pub fn filter(mut self, filter: FilterRules) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Creates the scratch directory below `dir` instead of the system temp dir.
    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    /// Replaces the bucket table.
    pub fn buckets(mut self, buckets: Vec<PlatformBucket>) -> Self {
        self.buckets = Some(buckets);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSetting`] if the base URL does not
    /// parse, is not http(s), or if the concurrency is zero.
    pub fn build(self) -> Result<Settings, ConfigurationError> {
        let raw_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(raw_url.trim_end_matches('/')).map_err(|e| {
            ConfigurationError::InvalidSetting {
                reason: format!("Invalid base URL {raw_url}: {e}"),
            }
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidSetting {
                reason: format!("Base URL must be http or https: {base_url}"),
            });
        }

        let concurrency = self.concurrency.unwrap_or(1);
        if concurrency == 0 {
            return Err(ConfigurationError::InvalidSetting {
                reason: "Concurrency must be at least 1".to_string(),
            });
        }

        Ok(Settings::new(
            base_url,
            self.project_id
                .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string()),
            self.signing_identity
                .unwrap_or_else(|| DEFAULT_SIGNING_IDENTITY.to_string()),
            self.sign_packages.unwrap_or(true),
            self.digest.unwrap_or_default(),
            (
                self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
                self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
                self.download_inactivity_timeout
                    .unwrap_or(DEFAULT_INACTIVITY_TIMEOUT),
            ),
            concurrency,
            self.filter.unwrap_or_default(),
            self.buckets.unwrap_or_else(default_buckets),
            self.scratch_root,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Arch;

    #[test]
    fn defaults_match_release_process() {
        let settings = SettingsBuilder::new().build().unwrap();
        assert_eq!(settings.base_url().as_str(), "https://teamcity-dss.cern.ch:8443/");
        assert_eq!(settings.project_id(), DEFAULT_PROJECT_ID);
        assert_eq!(settings.digest(), DigestAlgorithm::Md5);
        assert_eq!(settings.concurrency(), 1);
        assert_eq!(settings.buckets().len(), 4);
        assert!(settings.sign_packages());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = SettingsBuilder::new().concurrency(0).build().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidSetting { .. }));
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(SettingsBuilder::new().base_url("ftp://ci").build().is_err());
        assert!(SettingsBuilder::new().base_url("not a url").build().is_err());
    }

    #[test]
    fn signing_only_for_designated_systems() {
        let settings = SettingsBuilder::new().build().unwrap();
        let slc5 = PlatformBucket::new("slc5", Arch::X86_64, "slc-5-x86_64");
        let slc6 = PlatformBucket::new("slc6", Arch::X86_64, "slc-6-x86_64");
        assert!(!settings.requires_signing(&slc5));
        assert!(settings.requires_signing(&slc6));

        let unsigned = SettingsBuilder::new().sign_packages(false).build().unwrap();
        assert!(!unsigned.requires_signing(&slc6));
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let file: SettingsFile = toml::from_str(
            r#"
            base_url = "http://localhost:8111"
            digest = "sha256"
            concurrency = 3

            [filter]
            test_prefixes = ["mypkg-tests"]

            [[buckets]]
            system = "el9"
            arch = "x86_64"
            source_dir = "el-9-x86_64"
            "#,
        )
        .unwrap();
        let settings = SettingsBuilder::from_file(file).build().unwrap();
        assert_eq!(settings.base_url().host_str(), Some("localhost"));
        assert_eq!(settings.digest(), DigestAlgorithm::Sha256);
        assert_eq!(settings.concurrency(), 3);
        assert_eq!(settings.filter().test_prefixes, vec!["mypkg-tests".to_string()]);
        // unspecified filter keys keep their defaults
        assert_eq!(settings.filter().source_suffixes, vec!["src.rpm".to_string()]);
        assert_eq!(settings.buckets()[0].label(), "el9/x86_64");
        assert_eq!(settings.scratch_root(), None);
    }

    #[test]
    fn settings_file_rejects_unknown_keys() {
        assert!(toml::from_str::<SettingsFile>("base_uri = \"x\"").is_err());
        assert!(
            toml::from_str::<SettingsFile>("[filter]\ntest_prefix = [\"mypkg-tests\"]").is_err()
        );
        assert!(
            toml::from_str::<SettingsFile>(
                "[[buckets]]\nsystem = \"el9\"\narch = \"x86_64\"\nsource = \"el-9-x86_64\""
            )
            .is_err()
        );
    }
}
