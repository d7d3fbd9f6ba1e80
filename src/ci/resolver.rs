//! Tag resolution: configuration lookup and the build metadata walk.
//!
//! Resolution fetches the build listing of a configuration, then the detail
//! document of every listed build, and records the first tag of each tagged
//! build together with its artifact bundle URL. Untagged builds are skipped.
//! Any network or parse failure aborts the whole resolution.

use super::documents::{
    BuildConfiguration, BuildRef, parse_build_listing, parse_build_tag, parse_project_listing,
};
use super::{CiEndpoints, CiTransport, TagMap};
use crate::error::{ConfigurationError, Result};
use crate::settings::{ConfigSelector, Settings};
use futures::{StreamExt, TryStreamExt, stream};

/// Resolves configuration selectors and release tags against a CI server.
///
/// Build detail documents are fetched `concurrency` at a time. Results are
/// consumed in listing order regardless of completion order, so duplicate
/// tags resolve exactly as they would sequentially.
pub struct TagResolver<'a, T: CiTransport + ?Sized> {
    transport: &'a T,
    endpoints: CiEndpoints,
    concurrency: usize,
}

impl<T: CiTransport + ?Sized> std::fmt::Debug for TagResolver<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagResolver")
            .field("endpoints", &self.endpoints)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl<'a, T: CiTransport + ?Sized> TagResolver<'a, T> {
    pub fn new(transport: &'a T, settings: &Settings) -> Self {
        Self {
            transport,
            endpoints: CiEndpoints::new(settings.base_url(), settings.project_id()),
            concurrency: settings.concurrency().max(1),
        }
    }

    /// List the build configurations of the project, in document order.
    pub async fn lookup_configurations(&self) -> Result<Vec<BuildConfiguration>> {
        let url = self.endpoints.project_listing()?;
        let body = self.transport.fetch_document(&url).await?;
        let configurations = parse_project_listing(&body, url.as_str())?;
        log::debug!(
            "Project listing {} has {} configuration(s)",
            url,
            configurations.len()
        );
        Ok(configurations)
    }

    /// Turn a selector into a configuration id.
    ///
    /// An explicit id is returned as is without contacting the server; a name
    /// is looked up in the project listing.
    pub async fn resolve_config_id(&self, selector: &ConfigSelector) -> Result<String> {
        match selector {
            ConfigSelector::Id(id) => Ok(id.clone()),
            ConfigSelector::Name(name) => {
                let configurations = self.lookup_configurations().await?;
                let id = configurations
                    .into_iter()
                    .rfind(|c| &c.name == name)
                    .map(|c| c.id)
                    .ok_or_else(|| ConfigurationError::UnknownConfiguration {
                        name: name.clone(),
                    })?;
                log::info!("Configuration '{}' has id {}", name, id);
                Ok(id)
            }
        }
    }

    /// Builds listed for a configuration, in listing order.
    pub async fn list_builds(&self, config_id: &str) -> Result<Vec<BuildRef>> {
        let url = self.endpoints.build_listing(config_id)?;
        let body = self.transport.fetch_document(&url).await?;
        let builds = parse_build_listing(&body, url.as_str())?;
        log::info!("Configuration {} lists {} build(s)", config_id, builds.len());
        Ok(builds)
    }

    /// First tag of a build, `None` if the build is untagged.
    pub async fn fetch_tag(&self, build: &BuildRef) -> Result<Option<String>> {
        let url = self.endpoints.build_detail(&build.href)?;
        let body = self.transport.fetch_document(&url).await?;
        Ok(parse_build_tag(&body, url.as_str())?)
    }

    /// Build the tag → artifact URL map of a configuration.
    pub async fn build_tag_map(&self, config_id: &str) -> Result<TagMap> {
        let builds = self.list_builds(config_id).await?;

        let fetches = builds.iter().map(|build| async move {
            let tag = self.fetch_tag(build).await?;
            Ok::<_, crate::error::ReleaseError>((build, tag))
        });
        let tags: Vec<(&BuildRef, Option<String>)> = stream::iter(fetches)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut tag_map = TagMap::new();
        for (build, tag) in tags {
            let Some(tag) = tag else {
                log::debug!("Build {} has no tag, skipping", build.id);
                continue;
            };
            let url = self.endpoints.artifact_archive(config_id, &build.id)?;
            if let Some(previous) = tag_map.insert(tag.clone(), url) {
                log::warn!(
                    "Tag {} appears on several builds; build {} replaces {}",
                    tag,
                    build.id,
                    previous
                );
            }
        }

        log::info!("Resolved {} tag(s) for configuration {}", tag_map.len(), config_id);
        Ok(tag_map)
    }

    /// Resolve the selector, then build its tag map.
    pub async fn resolve(&self, selector: &ConfigSelector) -> Result<(String, TagMap)> {
        let config_id = self.resolve_config_id(selector).await?;
        let tag_map = self.build_tag_map(&config_id).await?;
        Ok((config_id, tag_map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::CannedTransport;
    use crate::error::{OperationError, ReleaseError};
    use crate::settings::SettingsBuilder;

    const BASE: &str = "http://ci.test";

    fn settings(concurrency: usize) -> Settings {
        SettingsBuilder::new()
            .base_url(BASE)
            .project_id("XRootD")
            .concurrency(concurrency)
            .build()
            .unwrap()
    }

    fn listing(ids: &[&str]) -> String {
        let builds: String = ids
            .iter()
            .map(|id| format!(r#"<build id="{id}" href="/guestAuth/app/rest/builds/id:{id}"/>"#))
            .collect();
        format!(r#"<builds count="{}">{builds}</builds>"#, ids.len())
    }

    fn detail(id: &str, tag: Option<&str>) -> String {
        match tag {
            Some(tag) => format!(r#"<build id="{id}"><tags><tag>{tag}</tag></tags></build>"#),
            None => format!(r#"<build id="{id}"><tags/></build>"#),
        }
    }

    fn server(builds: &[(&str, Option<&str>)]) -> CannedTransport {
        let ids: Vec<&str> = builds.iter().map(|(id, _)| *id).collect();
        let mut transport = CannedTransport::new().with_document(
            format!("{BASE}/guestAuth/app/rest/buildTypes/id:bt42/builds/"),
            listing(&ids),
        );
        for (id, tag) in builds {
            transport = transport.with_document(
                format!("{BASE}/guestAuth/app/rest/builds/id:{id}"),
                detail(id, *tag),
            );
        }
        transport
    }

    #[tokio::test]
    async fn maps_tags_to_artifact_urls_and_skips_untagged() {
        let transport = server(&[("3", Some("v4.2.0")), ("2", None), ("1", Some("v4.1.0"))]);
        let settings = settings(1);
        let resolver = TagResolver::new(&transport, &settings);

        let map = resolver.build_tag_map("bt42").await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("v4.2.0").unwrap().as_str(),
            "http://ci.test/guestAuth/repository/downloadAll/bt42/3:id/artifacts.zip"
        );
        // one listing request plus one detail request per build
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn duplicate_tag_later_build_in_listing_wins() {
        for concurrency in [1, 4] {
            let transport = server(&[("7", Some("v1")), ("5", Some("v1")), ("6", Some("v1"))]);
            let settings = settings(concurrency);
            let map = TagResolver::new(&transport, &settings)
                .build_tag_map("bt42")
                .await
                .unwrap();
            assert!(map.get("v1").unwrap().as_str().contains("/bt42/6:id/"));
        }
    }

    #[tokio::test]
    async fn no_tagged_builds_gives_empty_map() {
        let transport = server(&[("1", None), ("2", None)]);
        let settings = settings(1);
        let map = TagResolver::new(&transport, &settings)
            .build_tag_map("bt42")
            .await
            .unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn detail_failure_aborts_resolution() {
        // build 2 has no canned detail document
        let transport = server(&[("1", Some("v1"))]).with_document(
            format!("{BASE}/guestAuth/app/rest/buildTypes/id:bt42/builds/"),
            listing(&["1", "2"]),
        );
        let settings = settings(1);
        let err = TagResolver::new(&transport, &settings)
            .build_tag_map("bt42")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Operation(OperationError::Http { .. })
        ));
    }

    #[tokio::test]
    async fn name_selector_uses_project_listing() {
        let transport = server(&[("1", Some("v1"))]).with_document(
            format!("{BASE}/guestAuth/app/rest/projects/id:XRootD"),
            r#"<project id="XRootD"><buildTypes>
                 <buildType id="bt42" name="Release"/>
                 <buildType id="bt43" name="Nightly"/>
               </buildTypes></project>"#,
        );
        let settings = settings(1);
        let resolver = TagResolver::new(&transport, &settings);

        let (id, map) = resolver
            .resolve(&ConfigSelector::Name("Release".into()))
            .await
            .unwrap();
        assert_eq!(id, "bt42");
        assert!(map.get("v1").is_some());

        let err = resolver
            .resolve_config_id(&ConfigSelector::Name("Missing".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Configuration(ConfigurationError::UnknownConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn id_selector_skips_project_listing() {
        let transport = CannedTransport::new();
        let settings = settings(1);
        let id = TagResolver::new(&transport, &settings)
            .resolve_config_id(&ConfigSelector::Id("bt9".into()))
            .await
            .unwrap();
        assert_eq!(id, "bt9");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_project_listing_is_configuration_error() {
        let transport = CannedTransport::new().with_document(
            format!("{BASE}/guestAuth/app/rest/projects/id:XRootD"),
            "<html>Please log in</html>",
        );
        let settings = settings(1);
        let err = TagResolver::new(&transport, &settings)
            .lookup_configurations()
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
