//! Command line behavior of the `ci-release-unpack` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("ci-release-unpack").expect("binary is built");
    cmd.env_remove("CI_RELEASE_BASE_URL")
        .env_remove("CI_RELEASE_PROJECT")
        .env_remove("CI_RELEASE_SETTINGS")
        .env_remove("CI_RELEASE_SIGNING_IDENTITY");
    cmd
}

#[test]
fn help_lists_every_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list-configs")
                .and(predicate::str::contains("list-tags"))
                .and(predicate::str::contains("unpack")),
        );
}

#[test]
fn a_command_is_required() {
    cli().assert().failure();
}

#[test]
fn name_and_id_selectors_conflict() {
    cli()
        .args([
            "unpack",
            "--tag",
            "v4.2.0",
            "--config",
            "Release",
            "--config-id",
            "bt42",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unpack_requires_a_selector() {
    cli()
        .args(["unpack", "--tag", "v4.2.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--config"));
}

#[test]
fn non_http_base_url_is_a_configuration_error() {
    cli()
        .args(["--base-url", "ftp://ci.example.org", "list-configs"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: Configuration error"));
}

#[test]
fn unknown_digest_is_rejected() {
    cli()
        .args([
            "unpack", "--tag", "v4.2.0", "--config-id", "bt42", "--digest", "crc32",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown digest algorithm"));
}

#[test]
fn unreachable_server_is_an_operation_error() {
    let output = tempfile::tempdir().unwrap();
    cli()
        .args(["--base-url", "http://127.0.0.1:9", "--quiet", "unpack"])
        .args(["--tag", "v4.2.0", "--config-id", "bt42", "--no-sign", "--output"])
        .arg(output.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Operation error: HTTP request"));
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}
