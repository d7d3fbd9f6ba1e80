//! `list-tags`: every tag of a configuration with its artifact URL.

use super::{write_json, write_line};
use crate::ci::{CiTransport, TagResolver};
use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::settings::{ConfigSelector, Settings};
use std::io::Write;

#[derive(serde::Serialize)]
struct TagEntry<'a> {
    tag: &'a str,
    url: &'a str,
}

/// Print `<tag> <url>` sorted by tag, or a JSON array with `--json`.
pub async fn list_tags<T, W>(
    transport: &T,
    settings: &Settings,
    runtime: &RuntimeConfig,
    selector: &ConfigSelector,
    json: bool,
    out: &mut W,
) -> Result<i32>
where
    T: CiTransport + ?Sized,
    W: Write,
{
    let resolver = TagResolver::new(transport, settings);
    let (config_id, tag_map) = resolver.resolve(selector).await?;
    runtime.verbose_println(&format!(
        "Configuration {} has {} tag(s)",
        config_id,
        tag_map.len()
    ));

    let sorted = tag_map.sorted();
    if json {
        let entries: Vec<TagEntry<'_>> = sorted
            .iter()
            .map(|(tag, url)| TagEntry {
                tag: *tag,
                url: url.as_str(),
            })
            .collect();
        write_json(out, &entries)?;
    } else {
        for (tag, url) in &sorted {
            write_line(out, &format!("{tag} {url}"))?;
        }
    }

    if tag_map.is_empty() {
        runtime.warn(&format!("No tagged builds in configuration {config_id}"));
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::CannedTransport;
    use crate::cli::OutputManager;
    use crate::settings::SettingsBuilder;

    #[tokio::test]
    async fn prints_tags_sorted_as_json() {
        let settings = SettingsBuilder::new()
            .base_url("http://ci.test")
            .build()
            .unwrap();
        let transport = CannedTransport::new()
            .with_document(
                "http://ci.test/guestAuth/app/rest/buildTypes/id:bt42/builds/",
                r#"<builds count="2">
                     <build id="7" href="/guestAuth/app/rest/builds/id:7"/>
                     <build id="8" href="/guestAuth/app/rest/builds/id:8"/>
                   </builds>"#,
            )
            .with_document(
                "http://ci.test/guestAuth/app/rest/builds/id:7",
                r#"<build id="7"><tags><tag>v4.3.0</tag></tags></build>"#,
            )
            .with_document(
                "http://ci.test/guestAuth/app/rest/builds/id:8",
                r#"<build id="8"><tags><tag>v4.2.0</tag></tags></build>"#,
            );
        let runtime = RuntimeConfig::new(OutputManager::new(false, true));

        let mut out = Vec::new();
        list_tags(
            &transport,
            &settings,
            &runtime,
            &ConfigSelector::Id("bt42".into()),
            true,
            &mut out,
        )
        .await
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["tag"], "v4.2.0");
        assert_eq!(
            value[0]["url"],
            "http://ci.test/guestAuth/repository/downloadAll/bt42/8:id/artifacts.zip"
        );
        assert_eq!(value[1]["tag"], "v4.3.0");
    }
}
