//! The unpack pipeline: archive extraction, platform classification, package
//! signing and checksum manifests, driven by [`ReleaseUnpacker`].
//!
//! - [`archive`] - zip bundle extraction
//! - [`classify`] - per-bucket file selection
//! - [`checksum`] - digest calculation and manifests
//! - [`signing`] - [`Signer`] seam and the `rpm --resign` implementation
//! - [`orchestrator`] - [`ReleaseUnpacker`]

pub mod archive;
pub mod checksum;
pub mod classify;
mod fs;
mod orchestrator;
pub mod signing;
mod tool_detection;

pub use checksum::{ManifestEntry, calculate_file_digest, parse_manifest, write_manifest};
pub use classify::{classify, filter_entries};
pub use orchestrator::{BucketReport, ReleaseUnpacker, UnpackReport};
pub use signing::{RecordingSigner, RpmSigner, SignError, Signer};
