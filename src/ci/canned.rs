//! Canned-response transport (testing and offline replay)
//!
//! [`CannedTransport`] answers requests from a table keyed by the full URL
//! and records every request it served, so callers can assert on the exact
//! traffic a resolution or unpack produced.

use super::CiTransport;
use crate::error::{ErrorExt, OperationError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use url::Url;

/// In-memory [`CiTransport`] backed by a `HashMap<url, body>`.
#[derive(Debug, Default)]
pub struct CannedTransport {
    responses: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a text document for `url`.
    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), body.into().into_bytes());
        self
    }

    /// Register a binary body for `url`.
    pub fn with_bytes(mut self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.responses.insert(url.into(), body);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn lookup(&self, url: &Url) -> Result<&[u8], OperationError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.responses
            .get(url.as_str())
            .map(Vec::as_slice)
            .ok_or_else(|| OperationError::Http {
                url: url.to_string(),
                reason: "server answered 404 Not Found".to_string(),
            })
    }
}

#[async_trait]
impl CiTransport for CannedTransport {
    async fn fetch_document(&self, url: &Url) -> Result<String, OperationError> {
        let body = self.lookup(url)?;
        String::from_utf8(body.to_vec()).map_err(|e| OperationError::MalformedDocument {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn download(&self, url: &Url, dest: &Path) -> Result<u64, OperationError> {
        let body = self.lookup(url)?;
        tokio::fs::write(dest, body).await.fs_context("writing", dest)?;
        Ok(body.len() as u64)
    }
}
