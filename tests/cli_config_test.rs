//! Integration tests for configuration via CLI.
//!
//! Covers `td config get/set/list` and how config defaults flow into
//! `td create` and the output format.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_config_get_default() {
    let env = TestEnv::init();
    let value = env.json(&["config", "get", "default-priority"]);
    assert_eq!(value["value"], "medium");
    assert_eq!(value["scope"], "default");
}

#[test]
fn test_config_set_session_default_priority() {
    let env = TestEnv::init();
    let set = env.json(&["config", "set", "default-priority", "critical"]);
    assert_eq!(set["value"], "critical");
    assert_eq!(set["scope"], "session");

    let ticket = env.json(&["create", "Defaults apply"]);
    assert_eq!(ticket["priority"], "critical");
    assert_eq!(ticket["sla_hours"], 4);

    let explicit = env.json(&["create", "Flag wins", "-p", "low"]);
    assert_eq!(explicit["priority"], "low");
}

#[test]
fn test_session_overrides_system() {
    let env = TestEnv::init();
    env.json(&["config", "set", "--system", "default-category", "network"]);
    assert_eq!(
        env.json(&["config", "get", "default-category"])["scope"],
        "system"
    );

    env.json(&["config", "set", "default-category", "hardware"]);
    let value = env.json(&["config", "get", "default-category"]);
    assert_eq!(value["value"], "hardware");
    assert_eq!(value["scope"], "session");

    assert!(env.config_dir.path().join("config.kdl").exists());
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let env = TestEnv::init();
    env.td()
        .args(["config", "set", "default-priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));

    env.td()
        .args(["config", "set", "editor", "vim"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_output_format_from_config() {
    let env = TestEnv::init();
    env.json(&["config", "set", "output-format", "human"]);

    env.td()
        .arg("kpi")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 0"));
}

#[test]
fn test_config_list_json() {
    let env = TestEnv::init();
    let list = env.json(&["config", "list"]);
    assert_eq!(list["output_format"]["value"], "json");
    assert_eq!(list["default_priority"]["source"], "default");
    assert_eq!(list["default_category"]["value"], "technical");
}
