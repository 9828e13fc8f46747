//! Smoke tests for the td CLI.
//!
//! These tests verify basic CLI functionality:
//! - `td --version` outputs version info
//! - `td --help` outputs help text
//! - `td` (no args) outputs info as JSON

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

fn td() -> Command {
    Command::new(env!("CARGO_BIN_EXE_td"))
}

#[test]
fn test_version_flag() {
    td().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("td"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    td().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("kpi"));
}

#[test]
fn test_no_args_outputs_info_json() {
    let env = TestEnv::new();
    env.td()
        .assert()
        .success()
        .stdout(predicate::str::contains("\"initialized\":false"))
        .stdout(predicate::str::contains("\"version\""));
}

#[test]
fn test_invalid_command() {
    td().arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_sla_table() {
    let env = TestEnv::new();
    env.td()
        .args(["sla", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("critical  4h"))
        .stdout(predicate::str::contains("low       72h"));
}
