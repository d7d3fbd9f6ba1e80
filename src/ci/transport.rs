//! HTTP access to the CI server.
//!
//! All network traffic goes through [`CiTransport`] so the resolver and the
//! unpack pipeline can run against [`CannedTransport`](super::CannedTransport)
//! in tests instead of a live server.

use crate::error::{ErrorExt, OperationError};
use crate::settings::Settings;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use url::Url;

/// Read-only view of the CI server.
#[async_trait]
pub trait CiTransport: Send + Sync {
    /// GET a metadata document and return its body as text.
    async fn fetch_document(&self, url: &Url) -> Result<String, OperationError>;

    /// GET a binary resource and write it to `dest`, returning the byte count.
    async fn download(&self, url: &Url, dest: &Path) -> Result<u64, OperationError>;
}

/// [`CiTransport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    request_timeout: Duration,
    inactivity_timeout: Duration,
}

impl HttpTransport {
    /// Builds a client with the connect timeout and user agent from `settings`.
    pub fn new(settings: &Settings) -> Result<Self, OperationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .user_agent(concat!("ci-release-unpack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OperationError::Http {
                url: settings.base_url().to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            request_timeout: settings.request_timeout(),
            inactivity_timeout: settings.download_inactivity_timeout(),
        })
    }

    async fn get(&self, url: &Url, request_timeout: Option<Duration>) -> Result<reqwest::Response, OperationError> {
        let mut request = self.client.get(url.clone());
        if let Some(limit) = request_timeout {
            request = request.timeout(limit);
        }

        let response = request.send().await.map_err(|e| http_error(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OperationError::Http {
                url: url.to_string(),
                reason: format!("server answered {status}"),
            });
        }
        Ok(response)
    }
}

fn http_error(url: &Url, e: reqwest::Error) -> OperationError {
    OperationError::Http {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl CiTransport for HttpTransport {
    async fn fetch_document(&self, url: &Url) -> Result<String, OperationError> {
        log::debug!("GET {}", url);
        let response = self.get(url, Some(self.request_timeout)).await?;
        response.text().await.map_err(|e| http_error(url, e))
    }

    async fn download(&self, url: &Url, dest: &Path) -> Result<u64, OperationError> {
        log::info!("Downloading {}", url);
        let response = timeout(self.inactivity_timeout, self.get(url, None))
            .await
            .map_err(|_| OperationError::Http {
                url: url.to_string(),
                reason: format!("no response within {:?}", self.inactivity_timeout),
            })??;
        let total = response.content_length();

        let mut file = tokio::fs::File::create(dest)
            .await
            .fs_context("creating", dest)?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let chunk = match timeout(self.inactivity_timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(e))) => return Err(http_error(url, e)),
                Ok(None) => break,
                Err(_) => {
                    return Err(OperationError::Http {
                        url: url.to_string(),
                        reason: format!(
                            "no data received for {:?} after {} bytes",
                            self.inactivity_timeout,
                            downloaded
                        ),
                    });
                }
            };

            file.write_all(&chunk).await.fs_context("writing", dest)?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await.fs_context("flushing", dest)?;

        if let Some(expected) = total
            && expected != downloaded
        {
            return Err(OperationError::Http {
                url: url.to_string(),
                reason: format!("truncated download: {downloaded} of {expected} bytes"),
            });
        }

        log::debug!("Downloaded {} bytes to {}", downloaded, dest.display());
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsBuilder;
    use mockito::Server;

    fn transport(base: &str) -> HttpTransport {
        let settings = SettingsBuilder::new().base_url(base).build().unwrap();
        HttpTransport::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn fetches_document_text() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/guestAuth/app/rest/projects/id:XRootD")
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body("<project id=\"XRootD\"/>")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/guestAuth/app/rest/projects/id:XRootD", server.url())).unwrap();
        let body = transport(&server.url()).fetch_document(&url).await.unwrap();
        assert_eq!(body, "<project id=\"XRootD\"/>");
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/missing", server.url())).unwrap();
        let err = transport(&server.url()).fetch_document(&url).await.unwrap_err();
        match err {
            OperationError::Http { url: failed, reason } => {
                assert!(failed.ends_with("/missing"));
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn downloads_body_to_file() {
        let mut server = Server::new_async().await;
        let payload = vec![7u8; 100_000];
        let _m = server
            .mock("GET", "/artifacts.zip")
            .with_status(200)
            .with_body(payload.clone())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifacts.zip");
        let url = Url::parse(&format!("{}/artifacts.zip", server.url())).unwrap();
        let written = transport(&server.url()).download(&url, &dest).await.unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }

    fn impatient_transport(base: &str) -> HttpTransport {
        let settings = SettingsBuilder::new()
            .base_url(base)
            .download_inactivity_timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        HttpTransport::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn short_body_is_http_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/artifacts.zip")
            .with_status(200)
            .with_header("content-length", "1000")
            .with_body(vec![1u8; 10])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse(&format!("{}/artifacts.zip", server.url())).unwrap();
        let err = transport(&server.url())
            .download(&url, &dir.path().join("artifacts.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Http { .. }), "got {err}");
    }

    #[tokio::test]
    async fn stalled_body_hits_inactivity_timeout() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/artifacts.zip")
            .with_status(200)
            .with_chunked_body(|w| {
                use std::io::Write as _;
                w.write_all(b"first chunk")?;
                w.flush()?;
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(b"too late")
            })
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse(&format!("{}/artifacts.zip", server.url())).unwrap();
        let err = impatient_transport(&server.url())
            .download(&url, &dir.path().join("artifacts.zip"))
            .await
            .unwrap_err();
        match err {
            OperationError::Http { reason, .. } => assert!(reason.contains("no data received")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn silent_server_hits_timeout_before_headers() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accept connections and never answer
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let base = format!("http://{addr}");
        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse(&format!("{base}/artifacts.zip")).unwrap();
        let err = impatient_transport(&base)
            .download(&url, &dir.path().join("artifacts.zip"))
            .await
            .unwrap_err();
        match err {
            OperationError::Http { reason, .. } => assert!(reason.contains("no response")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
