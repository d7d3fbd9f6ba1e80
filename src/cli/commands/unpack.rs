//! `unpack`: download a tagged build and materialize its platform buckets.

use super::write_json;
use crate::ci::CiTransport;
use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::release::{ReleaseUnpacker, Signer, UnpackReport};
use crate::settings::{Settings, UnpackRequest};
use std::io::Write;

/// Run the unpack pipeline and report what was written.
///
/// Status goes through the runtime's output manager; with `json` the full
/// [`UnpackReport`] is printed on `out`.
pub async fn unpack<T, S, W>(
    transport: &T,
    signer: &S,
    settings: &Settings,
    runtime: &RuntimeConfig,
    request: &UnpackRequest,
    json: bool,
    out: &mut W,
) -> Result<i32>
where
    T: CiTransport + ?Sized,
    S: Signer + ?Sized,
    W: Write,
{
    runtime.progress(&format!(
        "Unpacking {} into {}",
        request.tag(),
        request.output_root().display()
    ));
    if !settings.sign_packages() {
        runtime.verbose_println("Package signing disabled");
    }

    let unpacker = ReleaseUnpacker::new(transport, signer, settings);
    let report = unpacker.unpack(request).await?;

    print_summary(runtime, &report);
    if json {
        write_json(out, &report)?;
    }
    Ok(0)
}

fn print_summary(runtime: &RuntimeConfig, report: &UnpackReport) {
    runtime.section(&format!(
        "{} ({} bytes from {})",
        report.tag, report.archive_bytes, report.archive_url
    ));
    for bucket in &report.buckets {
        let signed = if bucket.signed { ", signed" } else { "" };
        runtime.indent(&format!(
            "{}: {} package(s){} -> {}",
            bucket.bucket,
            bucket.files.len(),
            signed,
            bucket.dir.display()
        ));
    }
    runtime.success(&format!(
        "Unpacked {} bucket(s) for configuration {}",
        report.buckets.len(),
        report.config_id
    ));
}
