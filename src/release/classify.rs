//! Platform classification of extracted bundle entries.
//!
//! A bucket's file set is its source directory listing minus the mandatory
//! non-package entries, source packages and test packages. The decision is a
//! function of the file names alone.

use super::fs::list_entry_names;
use crate::bail_classify;
use crate::error::{ErrorExt, OperationError};
use crate::settings::{FilterRules, PlatformBucket};
use std::path::Path;

/// Apply `rules` to a directory listing.
///
/// Every entry in `rules.required_entries` must be present; it is removed
/// along with source and test packages. Remaining names keep their listing
/// order.
pub fn filter_entries(
    names: Vec<String>,
    rules: &FilterRules,
    bucket: &PlatformBucket,
) -> Result<Vec<String>, OperationError> {
    for required in &rules.required_entries {
        if !names.iter().any(|n| n == required) {
            bail_classify!(bucket, "expected entry '{}' is missing", required);
        }
    }

    Ok(names
        .into_iter()
        .filter(|name| !rules.required_entries.contains(name))
        .filter(|name| !rules.is_source_package(name))
        .filter(|name| !rules.is_test_package(name))
        .collect())
}

/// List the packages of `bucket` inside the extraction root.
///
/// # Errors
///
/// [`OperationError::Classify`] if the bucket's source directory is missing
/// or lacks a mandatory entry.
pub async fn classify(
    extract_root: &Path,
    bucket: &PlatformBucket,
    rules: &FilterRules,
) -> Result<Vec<String>, OperationError> {
    let source = bucket.source_path(extract_root);
    if !tokio::fs::try_exists(&source)
        .await
        .fs_context("inspecting", &source)?
    {
        bail_classify!(
            bucket,
            "bundle has no '{}' directory",
            bucket.source_dir
        );
    }

    let names = list_entry_names(&source).await?;
    let files = filter_entries(names, rules, bucket)?;
    log::debug!("{}: {} package(s) selected", bucket, files.len());
    Ok(files)
}
