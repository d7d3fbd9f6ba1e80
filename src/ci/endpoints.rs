//! URL templates of the CI server's REST and artifact endpoints.

use crate::error::OperationError;
use url::Url;

const PROJECT_PATH: &str = "/guestAuth/app/rest/projects/id:";
const BUILD_TYPE_PATH: &str = "/guestAuth/app/rest/buildTypes/id:";
const ARTIFACTS_PREFIX: &str = "/guestAuth/repository/downloadAll/";
const ARTIFACTS_SUFFIX: &str = ":id/artifacts.zip";

/// Builds every URL the resolver and the unpack pipeline request.
#[derive(Clone, Debug)]
pub struct CiEndpoints {
    /// Base URL without trailing slash
    base: String,
    project_id: String,
}

impl CiEndpoints {
    pub fn new(base_url: &Url, project_id: impl Into<String>) -> Self {
        Self {
            base: base_url.as_str().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
        }
    }

    /// Project document listing the build types (configurations).
    pub fn project_listing(&self) -> Result<Url, OperationError> {
        self.join(&format!("{PROJECT_PATH}{}", self.project_id))
    }

    /// Build listing of one configuration.
    pub fn build_listing(&self, config_id: &str) -> Result<Url, OperationError> {
        self.join(&format!("{BUILD_TYPE_PATH}{config_id}/builds/"))
    }

    /// Build detail document; `href` is the server-relative link from the listing.
    pub fn build_detail(&self, href: &str) -> Result<Url, OperationError> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return parse(href);
        }
        self.join(href)
    }

    /// Zip bundle with every artifact of a build.
    pub fn artifact_archive(&self, config_id: &str, build_id: &str) -> Result<Url, OperationError> {
        self.join(&format!(
            "{ARTIFACTS_PREFIX}{config_id}/{build_id}{ARTIFACTS_SUFFIX}"
        ))
    }

    fn join(&self, path: &str) -> Result<Url, OperationError> {
        let separator = if path.starts_with('/') { "" } else { "/" };
        parse(&format!("{}{}{}", self.base, separator, path))
    }
}

fn parse(raw: &str) -> Result<Url, OperationError> {
    Url::parse(raw).map_err(|e| OperationError::MalformedDocument {
        url: raw.to_string(),
        reason: format!("not a valid URL: {e}"),
    })
}
