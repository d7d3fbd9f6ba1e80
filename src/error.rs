//! Error types for release resolution and unpacking.
//!
//! Every failure is normalized into one of two kinds: a [`ConfigurationError`]
//! when the configuration selector cannot be turned into a configuration id,
//! and an [`OperationError`] for everything that goes wrong afterwards. Each
//! variant carries enough context (URL, bucket, path) to diagnose a failed run
//! without re-running it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Top-level error returned to the CLI
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// The configuration selector could not be resolved
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Tag resolution, download, extraction, classification, signing or checksum failure
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),
}

/// Failures resolving which CI build configuration to use
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// No build configuration with this name exists in the project
    #[error("Unknown build configuration: {name}")]
    UnknownConfiguration {
        /// Requested configuration name
        name: String,
    },

    /// The project listing could not be parsed as a build-type document
    #[error("Malformed project listing from {url}: {reason}")]
    MalformedProjectListing {
        /// Listing URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Both a configuration name and a configuration id were given
    #[error("Either a configuration name or a configuration id may be given, not both")]
    ConflictingSelector,

    /// Neither a configuration name nor a configuration id was given
    #[error("Either a configuration name or a configuration id needs to be specified")]
    MissingSelector,

    /// A setting value is unusable (bad URL, unreadable settings file, ...)
    #[error("Invalid setting: {reason}")]
    InvalidSetting {
        /// Reason for the error
        reason: String,
    },
}

/// Failures after a configuration id is known
#[derive(Error, Debug)]
pub enum OperationError {
    /// The tag is not attached to any build of the configuration
    #[error("Tag not found: {tag}")]
    TagNotFound {
        /// Requested tag
        tag: String,
    },

    /// Network failure or non-success HTTP status
    #[error("HTTP request to {url} failed: {reason}")]
    Http {
        /// Request URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// A build listing or build detail document could not be parsed
    #[error("Malformed document from {url}: {reason}")]
    MalformedDocument {
        /// Document URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The downloaded bundle is not a usable zip container
    #[error("Archive {archive} is invalid: {reason}")]
    Archive {
        /// Archive path
        archive: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// The bucket output directory was left behind by an earlier run
    #[error("Output directory already exists: {path}")]
    BucketExists {
        /// Existing directory
        path: PathBuf,
    },

    /// The extracted bucket directory does not have the expected shape
    #[error("Cannot classify files for {bucket}: {reason}")]
    Classify {
        /// Bucket label, e.g. `slc6/x86_64`
        bucket: String,
        /// Reason for the error
        reason: String,
    },

    /// The package signer failed
    #[error("Signing {bucket} failed: {reason}")]
    Sign {
        /// Bucket label
        bucket: String,
        /// Reason for the error
        reason: String,
    },

    /// Filesystem failure with the operation and path it happened on
    #[error("I/O error while {context} {}: {source}", path.display())]
    Io {
        /// What was being done
        context: String,
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Attach filesystem context to `std::io::Error` results.
pub trait ErrorExt<T> {
    /// Convert the error into [`OperationError::Io`] naming `context` and `path`.
    fn fs_context(self, context: &str, path: &Path) -> std::result::Result<T, OperationError>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: &Path) -> std::result::Result<T, OperationError> {
        self.map_err(|source| OperationError::Io {
            context: context.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Return early with an [`OperationError::Classify`] for the given bucket.
#[macro_export]
macro_rules! bail_classify {
    ($bucket:expr, $($arg:tt)*) => {
        return Err($crate::error::OperationError::Classify {
            bucket: $bucket.to_string(),
            reason: format!($($arg)*),
        }
        .into())
    };
}

impl ReleaseError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// True if the error happened before a configuration id was known
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
