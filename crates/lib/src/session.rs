//! Guarded store sessions.
//!
//! Every access to the data file goes through a [`Session`]. Opening one
//! acquires the advisory lock on `<path>.lock` (shared for reads, exclusive for
//! writes) and only then opens the engine. Closing runs the reverse sequence:
//! the engine handle is dropped, the lock is released, the lock file handle is
//! closed. The close sequence runs on every exit path, including errors and
//! panics unwinding through the session.
//!
//! ```text
//! LockAcquired -> StoreOpen -> StoreClosed -> Unlocked
//! ```
//!
//! The engine takes no part in cross-process safety. Read-only sessions load
//! the data file into memory under the shared lock and open the engine over
//! that image, so nothing the engine writes while opening (header flags,
//! crash recovery) ever reaches the shared file.

use std::fs;
use std::path::{Path, PathBuf};

use redb::backends::InMemoryBackend;
use redb::{Database, StorageBackend, TableDefinition, TableError};
use tracing::{debug, trace, warn};

use crate::config::StoreConfig;
use crate::error::KvError;
use crate::lock::{FileLock, LockMode};
use crate::platform::create_options;
use crate::Result;

const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kv");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
  ReadOnly,
  ReadWrite,
}

impl SessionMode {
  pub fn from_readonly(readonly: bool) -> Self {
    if readonly { SessionMode::ReadOnly } else { SessionMode::ReadWrite }
  }

  pub fn lock_mode(self) -> LockMode {
    match self {
      SessionMode::ReadOnly => LockMode::Shared,
      SessionMode::ReadWrite => LockMode::Exclusive,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  LockAcquired,
  StoreOpen,
  StoreClosed,
  Unlocked,
}

/// One lock-open-use-close-unlock cycle over the store file.
pub struct Session {
  db: Option<Database>,
  lock: FileLock,
  mode: SessionMode,
  state: SessionState,
  path: PathBuf,
}

impl Session {
  /// Acquires the lock for `mode` and opens the store, creating the data file
  /// (and its directory) if missing.
  ///
  /// If the store cannot be opened the lock is released before the error is
  /// returned.
  pub fn open(config: &StoreConfig, mode: SessionMode) -> Result<Self> {
    ensure_parent_dir(&config.path)?;

    let mut lock = FileLock::open(&config.lock_path(), config.mode)?;
    lock.acquire(mode.lock_mode())?;

    // From here on, dropping the session releases the lock.
    let mut session = Session {
      db: None,
      lock,
      mode,
      state: SessionState::LockAcquired,
      path: config.path.clone(),
    };

    session.db = Some(open_store(config, mode)?);
    session.state = SessionState::StoreOpen;
    debug!(path = %config.path.display(), ?mode, "store session opened");
    Ok(session)
  }

  /// Runs `op` inside a session and closes it afterwards, whatever `op`
  /// returns. An error from `op` wins over an error from closing.
  pub fn scoped<T>(config: &StoreConfig, mode: SessionMode, op: impl FnOnce(&Session) -> Result<T>) -> Result<T> {
    let session = Session::open(config, mode)?;
    let result = op(&session);
    let closed = session.close();
    let value = result?;
    closed?;
    Ok(value)
  }

  pub fn mode(&self) -> SessionMode {
    self.mode
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  /// Looks up `key`. A missing key is `Ok(None)`.
  pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
    let txn = self.db()?.begin_read()?;
    let table = match txn.open_table(TABLE) {
      Ok(table) => table,
      Err(TableError::TableDoesNotExist(_)) => return Ok(None),
      Err(err) => return Err(err.into()),
    };

    let value = table.get(key)?.map(|guard| guard.value().to_vec());
    trace!(key = %String::from_utf8_lossy(key), found = value.is_some(), "get");
    Ok(value)
  }

  /// Inserts or overwrites `key`.
  pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<()> {
    let txn = self.writable()?.begin_write()?;
    {
      let mut table = txn.open_table(TABLE)?;
      table.insert(key, value)?;
    }
    txn.commit()?;
    trace!(key = %String::from_utf8_lossy(key), len = value.len(), "insert");
    Ok(())
  }

  /// Removes every key in `keys` that is present, in one transaction.
  ///
  /// Returns the number of keys actually removed. If any removal fails the
  /// transaction is abandoned and none of the removals are kept.
  pub fn remove_all(&self, keys: &[&[u8]]) -> Result<usize> {
    let txn = self.writable()?.begin_write()?;
    let mut removed = 0;
    {
      let mut table = txn.open_table(TABLE)?;
      for key in keys {
        if table.remove(*key)?.is_some() {
          removed += 1;
        }
      }
    }
    txn.commit()?;
    trace!(requested = keys.len(), removed, "remove");
    Ok(removed)
  }

  /// Returns every stored key starting with `prefix`, in byte order.
  pub fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
    let txn = self.db()?.begin_read()?;
    let table = match txn.open_table(TABLE) {
      Ok(table) => table,
      Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
      Err(err) => return Err(err.into()),
    };

    let mut keys = Vec::new();
    for entry in table.range(prefix..)? {
      let (key, _) = entry?;
      let key = key.value();
      if !key.starts_with(prefix) {
        break;
      }
      keys.push(key.to_vec());
    }
    trace!(prefix = %String::from_utf8_lossy(prefix), count = keys.len(), "scan");
    Ok(keys)
  }

  /// Closes the store, then releases the lock. The lock file handle is closed
  /// when the session is dropped at the end of this call.
  pub fn close(mut self) -> Result<()> {
    self.shutdown()
  }

  fn db(&self) -> Result<&Database> {
    self.db.as_ref().ok_or(KvError::SessionClosed)
  }

  fn writable(&self) -> Result<&Database> {
    if self.mode == SessionMode::ReadOnly {
      return Err(KvError::ReadOnlySession);
    }
    self.db()
  }

  fn shutdown(&mut self) -> Result<()> {
    if self.state == SessionState::Unlocked {
      return Ok(());
    }

    if let Some(db) = self.db.take() {
      drop(db);
      self.state = SessionState::StoreClosed;
    }

    // The state advances even when release fails: closing the lock file
    // handle on drop gives the OS lock back regardless.
    let released = self.lock.release();
    self.state = SessionState::Unlocked;
    debug!(path = %self.path.display(), mode = ?self.mode, "store session closed");
    released.map_err(KvError::from)
  }
}

impl Drop for Session {
  fn drop(&mut self) {
    if let Err(err) = self.shutdown() {
      warn!(path = %self.path.display(), error = %err, "failed to close store session");
    }
  }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).map_err(|source| KvError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
  }
  Ok(())
}

fn ensure_store_file(config: &StoreConfig) -> Result<()> {
  create_options(config.mode)
    .open(&config.path)
    .map(drop)
    .map_err(|source| KvError::CreateFile {
      path: config.path.clone(),
      source,
    })
}

fn open_store(config: &StoreConfig, mode: SessionMode) -> Result<Database> {
  ensure_store_file(config)?;

  let opened = match mode {
    SessionMode::ReadWrite => Database::builder().create(&config.path),
    SessionMode::ReadOnly => {
      let backend = load_image(&config.path)?;
      Database::builder().create_with_backend(backend)
    }
  };

  opened.map_err(|source| KvError::Open {
    path: config.path.clone(),
    source,
  })
}

fn load_image(path: &Path) -> Result<InMemoryBackend> {
  let read_error = |source| KvError::ReadFile {
    path: path.to_path_buf(),
    source,
  };

  let bytes = fs::read(path).map_err(read_error)?;
  let backend = InMemoryBackend::new();
  if !bytes.is_empty() {
    backend.set_len(bytes.len() as u64).map_err(read_error)?;
    backend.write(0, &bytes).map_err(read_error)?;
  }
  Ok(backend)
}
