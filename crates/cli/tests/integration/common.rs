//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use dbmkv_lib::{DbmStore, StoreConfig};
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the store file.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Data file path (isolated per test).
  pub fn store_path(&self) -> PathBuf {
    self.temp.path().join("kvstore")
  }

  pub fn config(&self) -> StoreConfig {
    StoreConfig::new(self.store_path())
  }

  /// Direct library access to the same store the CLI uses.
  pub fn store(&self) -> DbmStore {
    DbmStore::new(self.config())
  }

  /// Get a Command for the dbmkv binary with the store path configured.
  pub fn dbmkv_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("dbmkv");
    cmd
      .env("DBMKV_FILE", self.store_path())
      .env_remove("DBMKV_MODE")
      .env_remove("RUST_LOG");
    cmd
  }
}
