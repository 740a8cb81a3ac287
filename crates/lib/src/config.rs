//! Store configuration.
//!
//! A [`StoreConfig`] names the data file and the permission bits used when the
//! data and lock files are first created. It is built once and handed to
//! [`DbmStore::new`](crate::DbmStore::new); nothing is read from global state
//! afterwards.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_FILENAME, DEFAULT_MODE, FILE_ENV, LOCK_SUFFIX, MODE_ENV};
use crate::platform::paths::data_dir;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid permission mode {value:?}: expected an octal value such as 644 or 0o600")]
  InvalidMode { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
  /// Path of the data file.
  pub path: PathBuf,
  /// Permission bits for newly created files.
  pub mode: u32,
}

impl StoreConfig {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      mode: DEFAULT_MODE,
    }
  }

  pub fn with_mode(mut self, mode: u32) -> Self {
    self.mode = mode;
    self
  }

  /// Builds a config from `DBMKV_FILE` and `DBMKV_MODE`.
  ///
  /// Unset variables fall back to `<data_dir>/kvstore` and `0o644`. When no
  /// data directory can be resolved the store lives in the working directory.
  pub fn from_env() -> Result<Self, ConfigError> {
    let path = match std::env::var_os(FILE_ENV).filter(|v| !v.is_empty()) {
      Some(path) => PathBuf::from(path),
      None => default_path(),
    };

    let mode = match std::env::var(MODE_ENV) {
      Ok(value) if !value.trim().is_empty() => parse_mode(&value)?,
      _ => DEFAULT_MODE,
    };

    Ok(Self { path, mode })
  }

  /// Path of the companion lock file: the data file path plus `.lock`.
  pub fn lock_path(&self) -> PathBuf {
    let mut name = OsString::from(self.path.as_os_str());
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self::new(default_path())
  }
}

fn default_path() -> PathBuf {
  data_dir()
    .map(|dir| dir.join(DEFAULT_FILENAME))
    .unwrap_or_else(|| PathBuf::from(DEFAULT_FILENAME))
}

/// Parses an octal permission mode: `644`, `0644` or `0o644`.
pub fn parse_mode(value: &str) -> Result<u32, ConfigError> {
  let trimmed = value.trim();
  let digits = trimmed
    .strip_prefix("0o")
    .or_else(|| trimmed.strip_prefix("0O"))
    .unwrap_or(trimmed);

  match u32::from_str_radix(digits, 8) {
    Ok(mode) if !digits.is_empty() && mode <= 0o7777 => Ok(mode),
    _ => Err(ConfigError::InvalidMode {
      value: value.to_string(),
    }),
  }
}
