//! Release unpacking library for CI-built package bundles
//!
//! This library resolves release tags against a CI server's REST API,
//! downloads the artifact bundle of the tagged build and sorts its packages
//! into per-platform directories:
//! - tag resolution over build listings and build details ([`ci`])
//! - extraction, filtering, re-signing and checksum manifests ([`release`])
//! - defaults, settings files and typed requests ([`settings`])
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod ci;
pub mod cli;
pub mod error;
pub mod release;
pub mod settings;

// Re-export commonly used types
pub use error::{ConfigurationError, OperationError, ReleaseError, Result};
