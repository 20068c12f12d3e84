//! Focused CLI argument parsing tests.
//!
//! These never touch a store: clap rejects the input before any command
//! runs.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;

fn mcctl() -> Command {
    Command::cargo_bin("mcctl").unwrap()
}

#[test]
fn version_flag_shows_version() {
    mcctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mcctl"));
}

#[test]
fn help_flag_shows_usage() {
    mcctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("registration"))
        .stdout(predicate::str::contains("cluster"))
        .stdout(predicate::str::contains("--data-dir"));
}

#[test]
fn missing_subcommand_fails() {
    mcctl().assert().failure();
}

#[test]
fn cluster_add_requires_connection_string() {
    mcctl()
        .args(["cluster", "add", "dc1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--connection-string"));
}

#[test]
fn cluster_names_are_validated() {
    mcctl()
        .args(["cluster", "show", "a/b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not contain '/'"));
}

#[test]
fn unknown_state_is_rejected() {
    mcctl()
        .args(["cluster", "set-state", "dc1", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown data cluster state"));
}

#[test]
fn malformed_id_is_rejected() {
    mcctl()
        .args(["registration", "export-data", "dc1", "--id", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid cluster id"));
}

#[test]
fn registration_help_lists_subcommands() {
    mcctl()
        .args(["registration", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init-management"))
        .stdout(predicate::str::contains("export-data"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("verify"));
}
