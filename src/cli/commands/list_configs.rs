//! `list-configs`: the build configurations of the project.

use super::{write_json, write_line};
use crate::ci::{CiTransport, TagResolver};
use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::settings::Settings;
use std::io::Write;

/// Print `<id> <name>` per configuration, or a JSON array with `--json`.
pub async fn list_configs<T, W>(
    transport: &T,
    settings: &Settings,
    runtime: &RuntimeConfig,
    json: bool,
    out: &mut W,
) -> Result<i32>
where
    T: CiTransport + ?Sized,
    W: Write,
{
    runtime.verbose_println(&format!(
        "Listing build configurations of project {} on {}",
        settings.project_id(),
        settings.base_url()
    ));

    let resolver = TagResolver::new(transport, settings);
    let configurations = resolver.lookup_configurations().await?;

    if json {
        write_json(out, &configurations)?;
    } else {
        for configuration in &configurations {
            write_line(out, &format!("{} {}", configuration.id, configuration.name))?;
        }
    }

    if configurations.is_empty() {
        runtime.warn(&format!(
            "Project {} has no build configurations",
            settings.project_id()
        ));
    }
    Ok(0)
}
