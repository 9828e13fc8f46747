//! Common test utilities for ticketdesk integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's `~/.local/share/ticketdesk/` or `~/.config/ticketdesk/`.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data and config storage.
///
/// The `td()` method returns a `Command` that sets `TD_DATA_DIR` and
/// `TD_CONFIG_DIR` per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub workspace_dir: TempDir,
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            workspace_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and run `td init`.
    pub fn init() -> Self {
        let env = Self::new();
        env.td().arg("init").assert().success();
        env
    }

    /// Get a Command for the td binary with isolated directories.
    pub fn td(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_td"));
        cmd.current_dir(self.workspace_dir.path());
        cmd.env("TD_DATA_DIR", self.data_dir.path());
        cmd.env("TD_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("TD_WORKSPACE");
        cmd.env_remove("TD_LOG");
        cmd
    }

    /// Run `td` with `args`, assert success, and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.td().args(args).assert().success().get_output().clone();
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Create a ticket and return its id.
    pub fn create(&self, title: &str, priority: &str) -> String {
        let value = self.json(&["create", title, "-p", priority]);
        value["id"].as_str().unwrap().to_string()
    }

    pub fn workspace_path(&self) -> &std::path::Path {
        self.workspace_dir.path()
    }

    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
