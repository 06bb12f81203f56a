//! Common test utilities and fixtures
//!
//! Every test gets its own temp directory holding the group store, the
//! roster file and the working directory of the binary.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated environment for driving the simple-roles binary
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.path().join("data")
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("groups.json")
    }

    pub fn roster_path(&self) -> PathBuf {
        self.path().join("online.txt")
    }

    /// The binary with configuration pinned to this environment
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("simple-roles").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("SIMPLE_ROLES_DATA_DIR", self.data_dir())
            .env("SIMPLE_ROLES_ROSTER_FILE", self.roster_path())
            .env_remove("SIMPLE_ROLES_USER")
            .env_remove("SIMPLE_ROLES_CONFIG")
            .env_remove("SIMPLE_ROLES_NAMESPACE_PREFIX")
            .env_remove("SIMPLE_ROLES_STRICT_JOIN")
            .env_remove("SIMPLE_ROLES_STORE_FILE")
            .env_remove("SIMPLE_ROLES_LOG_LEVEL")
            .env_remove("SIMPLE_ROLES_LOG_FILE");
        cmd
    }

    /// `roles <args>` issued by `user`
    pub fn roles(&self, user: &str, args: &[&str]) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("roles").arg("--user").arg(user).args(args);
        cmd
    }

    /// Replace the roster with `users`
    pub fn set_online(&self, users: &[&str]) {
        let mut content = users.join("\n");
        content.push('\n');
        fs::write(self.roster_path(), content).unwrap();
    }

    /// Seed the group store with raw JSON
    pub fn write_store(&self, json: &str) {
        fs::create_dir_all(self.data_dir()).unwrap();
        fs::write(self.store_path(), json).unwrap();
    }
}
