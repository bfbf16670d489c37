//! End-to-end tests for CLI exit codes and shell completions.
//!
//! - Exit code 0: Success
//! - Exit code 1: Any error reported by a command
//! - Exit code 2: Invalid command-line usage (handled by clap)

mod common;
use common::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("solution-build");
    cmd.arg("--help").assert().code(0);
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("solution-build");
    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("solution-build"));
}

/// Exit code 1 is returned when the manifest does not exist.
#[test]
fn test_exit_code_missing_manifest() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("order")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load manifest"));
}

/// Exit code 1 is returned for invalid manifest YAML.
#[test]
fn test_exit_code_invalid_manifest() {
    let fixture = TestFixture::new().with_manifest("modules: [unclosed");

    fixture
        .command()
        .arg("order")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML parsing error"));
}

/// Exit code 2 is returned for an unknown subcommand.
#[test]
fn test_exit_code_unknown_subcommand() {
    let mut cmd = cargo_bin_cmd!("solution-build");
    cmd.arg("package").assert().code(2);
}

/// Exit code 2 is returned for an invalid completion shell.
#[test]
fn test_exit_code_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("solution-build");
    cmd.args(["completions", "tcsh"]).assert().code(2);
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("solution-build");
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("solution-build"));
}
