//! Common test utilities for tasktree integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's real data directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// The `tt()` method returns a `Command` that sets `TT_DATA_DIR` per
/// invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tt binary with isolated data directory.
    pub fn tt(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tt"));
        cmd.env("TT_DATA_DIR", self.data_dir.path());
        cmd.env_remove("TT_LOG");
        cmd
    }

    /// Run each line through `tt -e` in one invocation and return stdout.
    pub fn exec(&self, lines: &[&str]) -> String {
        let mut cmd = self.tt();
        for line in lines {
            cmd.arg("-e").arg(line);
        }
        let output = cmd.assert().success().get_output().stdout.clone();
        String::from_utf8(output).unwrap()
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
