//! Package signing.
//!
//! Packages of signing-designated systems are re-signed in place before their
//! manifest is written, so the manifest always describes the signed bytes.

use super::tool_detection::RPM_TOOL;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Signing failures
#[derive(Error, Debug)]
pub enum SignError {
    /// The signing tool is not installed
    #[error("{tool} not found in PATH")]
    ToolNotFound {
        /// Tool name
        tool: String,
    },

    /// The signing tool could not be started
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// Tool name
        tool: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The signing tool exited unsuccessfully
    #[error("{tool} exited with {status}")]
    Failed {
        /// Tool name
        tool: String,
        /// Exit status description
        status: String,
    },

    /// A file could not be modified
    #[error("cannot sign {}: {source}", path.display())]
    Io {
        /// File being signed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Signs a batch of package files in place.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign every file in `files`. Failures are reported, never retried.
    async fn sign(&self, files: &[PathBuf]) -> Result<(), SignError>;
}

/// Re-signs RPM packages with `rpm --resign` under a fixed GPG identity.
#[derive(Clone, Debug)]
pub struct RpmSigner {
    identity: String,
}

impl RpmSigner {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    /// The `--define` macro selecting the signing key.
    pub fn gpg_name_macro(&self) -> String {
        format!("_gpg_name {}", self.identity)
    }
}

#[async_trait]
impl Signer for RpmSigner {
    async fn sign(&self, files: &[PathBuf]) -> Result<(), SignError> {
        if files.is_empty() {
            return Ok(());
        }

        let rpm = RPM_TOOL.as_ref().ok_or_else(|| SignError::ToolNotFound {
            tool: "rpm".to_string(),
        })?;

        log::info!(
            "Signing {} package(s) as {}",
            files.len(),
            self.identity
        );

        // stdio is inherited so gpg can ask for the key passphrase
        let status = tokio::process::Command::new(rpm)
            .arg("--resign")
            .arg("--define")
            .arg(self.gpg_name_macro())
            .args(files)
            .status()
            .await
            .map_err(|source| SignError::Spawn {
                tool: "rpm".to_string(),
                source,
            })?;

        if !status.success() {
            return Err(SignError::Failed {
                tool: "rpm".to_string(),
                status: status.to_string(),
            });
        }

        Ok(())
    }
}

/// Signer fake that appends a marker to every file and records each batch.
///
/// Appending changes every digest, which makes it visible whether a manifest
/// was computed before or after signing.
#[derive(Debug, Default)]
pub struct RecordingSigner {
    marker: Vec<u8>,
    fail: bool,
    batches: Mutex<Vec<Vec<PathBuf>>>,
}

impl RecordingSigner {
    /// Signer that appends `marker` to each file.
    pub fn new(marker: impl Into<Vec<u8>>) -> Self {
        Self {
            marker: marker.into(),
            ..Self::default()
        }
    }

    /// Signer that always fails without touching files.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Batches signed so far.
    pub fn batches(&self) -> Vec<Vec<PathBuf>> {
        self.batches
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Signer for RecordingSigner {
    async fn sign(&self, files: &[PathBuf]) -> Result<(), SignError> {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(files.to_vec());
        }
        if self.fail {
            return Err(SignError::Failed {
                tool: "recording signer".to_string(),
                status: "exit status: 1".to_string(),
            });
        }

        for path in files {
            let mut data = tokio::fs::read(path)
                .await
                .map_err(|source| SignError::Io {
                    path: path.clone(),
                    source,
                })?;
            data.extend_from_slice(&self.marker);
            tokio::fs::write(path, data)
                .await
                .map_err(|source| SignError::Io {
                    path: path.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
