//! Command execution functions.
//!
//! Each command takes the transport it talks to and the writer results are
//! printed on, so the same code path runs against a live server and a canned
//! one.

mod list_configs;
mod list_tags;
mod unpack;

pub use list_configs::list_configs;
pub use list_tags::list_tags;
pub use unpack::unpack;

use crate::error::{ErrorExt, OperationError};
use std::io::Write;
use std::path::Path;

/// Label used for write failures on the result stream.
const STDOUT: &str = "<stdout>";

/// Write `value` as pretty JSON followed by a newline.
fn write_json<W: Write, V: serde::Serialize>(out: &mut W, value: &V) -> Result<(), OperationError> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(std::io::Error::from)
        .and_then(|()| writeln!(out))
        .fs_context("writing results to", Path::new(STDOUT))
}

/// Write one plain result line.
fn write_line<W: Write>(out: &mut W, line: &str) -> Result<(), OperationError> {
    writeln!(out, "{line}").fs_context("writing results to", Path::new(STDOUT))
}
