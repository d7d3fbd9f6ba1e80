//! Configuration for release resolution and unpacking.
//!
//! [`Settings`] holds the CI endpoint, signing, digest and classification
//! configuration for one invocation and is constructed through
//! [`SettingsBuilder`], optionally seeded from a TOML [`SettingsFile`].
//! [`UnpackRequest`] and [`ConfigSelector`] are the typed form of the
//! command-line options.

mod arch;
mod builder;
mod core;
mod filter;
mod platform;
mod request;

pub use arch::Arch;
pub use builder::{
    DEFAULT_BASE_URL, DEFAULT_PROJECT_ID, DEFAULT_SIGNING_IDENTITY, SettingsBuilder, SettingsFile,
};
pub use self::core::{DigestAlgorithm, Settings};
pub use filter::FilterRules;
pub use platform::{PlatformBucket, SIGNED_SYSTEMS, default_buckets};
pub use request::{ConfigSelector, UnpackRequest};
