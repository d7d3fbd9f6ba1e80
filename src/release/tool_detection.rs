//! External tool detection and availability checking.

use std::path::PathBuf;
use std::sync::LazyLock;

/// Location of the `rpm` tool used for re-signing packages.
///
/// Cached result to avoid repeated PATH lookups across buckets.
pub static RPM_TOOL: LazyLock<Option<PathBuf>> = LazyLock::new(|| match which::which("rpm") {
    Ok(path) => {
        log::debug!("Found rpm at: {}", path.display());
        Some(path)
    }
    Err(e) => {
        log::debug!("rpm not found in PATH: {}. Package signing is unavailable.", e);
        None
    }
});
