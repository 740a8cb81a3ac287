//! Error types for dbmkv-lib.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::config::ConfigError;
use crate::lock::LockError;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum KvError {
  #[error(transparent)]
  Lock(#[from] LockError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("failed to create store directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create store file {path}: {source}")]
  CreateFile {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read store file {path}: {source}")]
  ReadFile {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to open store {path}: {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: redb::DatabaseError,
  },

  #[error("store transaction failed: {0}")]
  Transaction(#[from] redb::TransactionError),

  #[error("store table unavailable: {0}")]
  Table(#[from] redb::TableError),

  #[error("store storage error: {0}")]
  Storage(#[from] redb::StorageError),

  #[error("store commit failed: {0}")]
  Commit(#[from] redb::CommitError),

  #[error("store session is already closed")]
  SessionClosed,

  #[error("cannot modify the store through a read-only session")]
  ReadOnlySession,

  /// A stored key is not valid UTF-8. The store is corrupt.
  #[error("stored key is not valid UTF-8: {0}")]
  KeyDecode(#[from] FromUtf8Error),
}
