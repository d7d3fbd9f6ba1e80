//! Command line interface for ci-release-unpack.
//!
//! This module wires parsed arguments to the live HTTP transport and the
//! `rpm` signer, then dispatches to the command implementations.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig, SelectorArgs};
pub use output::OutputManager;

use crate::ci::HttpTransport;
use crate::error::Result;
use crate::release::RpmSigner;
use crate::settings::UnpackRequest;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let runtime = RuntimeConfig::from(&args);
    let settings = args.to_settings()?;
    log::debug!("Using CI server {}", settings.base_url());

    let transport = HttpTransport::new(&settings)?;
    let mut stdout = std::io::stdout();

    match &args.command {
        Command::ListConfigs { json } => {
            commands::list_configs(&transport, &settings, &runtime, *json, &mut stdout).await
        }
        Command::ListTags { selector, json } => {
            let selector = selector.selector()?;
            commands::list_tags(&transport, &settings, &runtime, &selector, *json, &mut stdout)
                .await
        }
        Command::Unpack {
            tag,
            selector,
            output,
            json,
            ..
        } => {
            let request = UnpackRequest::new(tag.clone(), selector.selector()?, output.clone())?;
            let signer = RpmSigner::new(settings.signing_identity());
            commands::unpack(
                &transport,
                &signer,
                &settings,
                &runtime,
                &request,
                *json,
                &mut stdout,
            )
            .await
        }
    }
}
