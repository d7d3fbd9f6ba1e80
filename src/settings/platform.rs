//! Static platform bucket table.

use super::Arch;
use std::fmt;
use std::path::{Path, PathBuf};

/// A (system, architecture) output classification.
///
/// Each bucket maps a fixed sub-directory of the extracted artifact bundle
/// (`source_dir`, e.g. `slc-6-x86_64`) onto the output directory
/// `<output root>/<system>/<arch>`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformBucket {
    /// Operating system name, e.g. `slc6`
    pub system: String,
    /// CPU architecture
    pub arch: Arch,
    /// Sub-directory inside the extracted bundle holding this bucket's packages
    pub source_dir: String,
}

impl PlatformBucket {
    /// Creates a bucket entry.
    pub fn new(system: impl Into<String>, arch: Arch, source_dir: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            arch,
            source_dir: source_dir.into(),
        }
    }

    /// Directory this bucket is materialized in below `output_root`.
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.system).join(self.arch.as_str())
    }

    /// Directory holding the bucket's files inside the extraction root.
    pub fn source_path(&self, extract_root: &Path) -> PathBuf {
        extract_root.join(&self.source_dir)
    }

    /// Label used in logs and errors, e.g. `slc6/x86_64`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PlatformBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.system, self.arch)
    }
}

/// Systems whose packages are re-signed before the manifest is written.
pub const SIGNED_SYSTEMS: &[&str] = &["slc6"];

/// The bucket table the CI bundle is laid out with.
pub fn default_buckets() -> Vec<PlatformBucket> {
    vec![
        PlatformBucket::new("slc5", Arch::I386, "slc-5-i386"),
        PlatformBucket::new("slc5", Arch::X86_64, "slc-5-x86_64"),
        PlatformBucket::new("slc6", Arch::I386, "slc-6-i386"),
        PlatformBucket::new("slc6", Arch::X86_64, "slc-6-x86_64"),
    ]
}
