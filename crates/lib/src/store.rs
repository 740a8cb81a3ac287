//! File-backed key-value store.
//!
//! [`DbmStore`] exposes the four operations a cache layer needs. Each call
//! opens exactly one [`Session`], does its work, and closes it again; no
//! handle survives between calls, so every call sees the file as the last
//! writer left it, whichever process that was.
//!
//! Keys are strings and are stored as their UTF-8 bytes. Values are opaque.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::Result;
use crate::config::StoreConfig;
use crate::session::{Session, SessionMode};

/// A persistence backend for cached artifacts.
pub trait KvBackend {
  /// Returns the value stored under `key`, or `None` if there is none.
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

  /// Inserts or overwrites `key`.
  fn set(&self, key: &str, value: &[u8]) -> Result<()>;

  /// Deletes each key in `keys`. Keys that are not stored are skipped.
  fn delete(&self, keys: &[&str]) -> Result<()>;

  /// Returns every stored key that starts with `prefix`.
  ///
  /// Callers must not depend on the order of the result.
  fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Store over a single data file guarded by `<path>.lock`.
#[derive(Debug, Clone)]
pub struct DbmStore {
  config: StoreConfig,
}

impl DbmStore {
  pub fn new(config: StoreConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &StoreConfig {
    &self.config
  }

  pub fn path(&self) -> &Path {
    &self.config.path
  }

  pub fn lock_path(&self) -> PathBuf {
    self.config.lock_path()
  }
}

impl KvBackend for DbmStore {
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
    Session::scoped(&self.config, SessionMode::ReadOnly, |session| session.get(key.as_bytes()))
  }

  fn set(&self, key: &str, value: &[u8]) -> Result<()> {
    Session::scoped(&self.config, SessionMode::ReadWrite, |session| {
      session.insert(key.as_bytes(), value)
    })
  }

  fn delete(&self, keys: &[&str]) -> Result<()> {
    let raw: Vec<&[u8]> = keys.iter().map(|key| key.as_bytes()).collect();
    let removed = Session::scoped(&self.config, SessionMode::ReadWrite, |session| session.remove_all(&raw))?;
    debug!(requested = keys.len(), removed, "deleted keys");
    Ok(())
  }

  fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
    let raw = Session::scoped(&self.config, SessionMode::ReadOnly, |session| {
      session.keys_with_prefix(prefix.as_bytes())
    })?;

    // A key that is not UTF-8 was never written through this API.
    let keys = raw.into_iter().map(String::from_utf8).collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(keys)
  }
}
