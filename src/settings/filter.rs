//! Filename rules deciding which bundle entries are release packages.

/// Filename patterns applied to a bucket's directory listing.
///
/// Filtering depends on names only, never on file contents.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterRules {
    /// Entries that must be present and are always dropped (build logs, bundle manifest)
    pub required_entries: Vec<String>,
    /// Suffixes marking source packages
    pub source_suffixes: Vec<String>,
    /// Prefixes marking test packages
    pub test_prefixes: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            required_entries: vec!["logs".to_string(), "manifest.txt".to_string()],
            source_suffixes: vec!["src.rpm".to_string()],
            test_prefixes: vec!["xrootd4-tests".to_string()],
        }
    }
}

impl FilterRules {
    /// True if `name` is a source package.
    pub fn is_source_package(&self, name: &str) -> bool {
        self.source_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// True if `name` is a test package.
    pub fn is_test_package(&self, name: &str) -> bool {
        self.test_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}
