//! Typed command requests.

use crate::error::ConfigurationError;
use std::path::PathBuf;

/// Which CI build configuration to read builds from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigSelector {
    /// Explicit build configuration id
    Id(String),
    /// Human name, resolved through the project listing
    Name(String),
}

impl ConfigSelector {
    /// Build a selector from the optional name and id given on the command line.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::ConflictingSelector`] if both are given,
    /// [`ConfigurationError::MissingSelector`] if neither is.
    pub fn from_parts(
        name: Option<String>,
        id: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        match (name, id) {
            (Some(_), Some(_)) => Err(ConfigurationError::ConflictingSelector),
            (None, Some(id)) if !id.is_empty() => Ok(Self::Id(id)),
            (Some(name), None) if !name.is_empty() => Ok(Self::Name(name)),
            _ => Err(ConfigurationError::MissingSelector),
        }
    }
}

/// Everything `unpack` needs: which tag, from which configuration, where to.
#[derive(Clone, Debug)]
pub struct UnpackRequest {
    tag: String,
    selector: ConfigSelector,
    output_root: PathBuf,
}

impl UnpackRequest {
    /// Creates a validated request.
    ///
    /// Surrounding whitespace is stripped from the tag, matching how tags are
    /// read from build detail documents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSetting`] for an empty tag.
    pub fn new(
        tag: impl Into<String>,
        selector: ConfigSelector,
        output_root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigurationError> {
        let tag = tag.into().trim().to_string();
        if tag.is_empty() {
            return Err(ConfigurationError::InvalidSetting {
                reason: "Tag name must not be empty".to_string(),
            });
        }
        Ok(Self {
            tag,
            selector,
            output_root: output_root.into(),
        })
    }

    /// Returns the requested tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the configuration selector.
    pub fn selector(&self) -> &ConfigSelector {
        &self.selector
    }

    /// Returns the directory the bucket tree is created in.
    pub fn output_root(&self) -> &std::path::Path {
        &self.output_root
    }
}
