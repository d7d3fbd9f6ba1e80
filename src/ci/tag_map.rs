//! Mapping from release tag to artifact archive URL.

use std::collections::HashMap;
use url::Url;

/// Tag → artifact bundle URL for one configuration, built fresh per run.
///
/// Inserting an existing tag replaces its URL, so when the server returns
/// the same tag on several builds the one visited last wins. Visiting order
/// is the server's listing order; it is not a "most recent build" guarantee.
#[derive(Clone, Debug, Default)]
pub struct TagMap {
    entries: HashMap<String, Url>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the URL for `tag`, returning the replaced URL.
    pub fn insert(&mut self, tag: impl Into<String>, url: Url) -> Option<Url> {
        self.entries.insert(tag.into(), url)
    }

    /// Artifact URL for `tag`, `None` if the tag is unknown.
    pub fn get(&self, tag: &str) -> Option<&Url> {
        self.entries.get(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by tag, for stable listings.
    pub fn sorted(&self) -> Vec<(&str, &Url)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(t, u)| (t.as_str(), u)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
