//! ci-release-unpack - resolve a CI release tag and unpack its packages.
//!
//! This binary downloads the artifact bundle of a tagged build and writes
//! one `<system>/<arch>/` directory per platform with a checksum manifest.

use ci_release_unpack::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
