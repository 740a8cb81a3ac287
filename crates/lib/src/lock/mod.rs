//! Advisory file locking for cross-process mutual exclusion.
//!
//! A [`FileLock`] wraps an open handle on a dedicated lock file. Shared locks
//! may be held by any number of handles at once; an exclusive lock excludes
//! every other handle, in this process or any other.
//!
//! Unix uses BSD `flock`, which is attached to the open file description:
//! two handles opened by threads of the same process contend exactly like
//! two processes do. Windows uses `LockFileEx` on the first byte of the file.
//! Both primitives provide real shared locks.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::create_options;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as sys;

/// Name of the OS primitive backing [`FileLock`] on this platform.
pub const PRIMITIVE: &str = sys::PRIMITIVE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
  Shared,
  Exclusive,
}

impl LockMode {
  pub fn from_exclusive(exclusive: bool) -> Self {
    if exclusive { LockMode::Exclusive } else { LockMode::Shared }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      LockMode::Shared => "shared",
      LockMode::Exclusive => "exclusive",
    }
  }
}

impl fmt::Display for LockMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum LockError {
  #[error("failed to open lock file {path}: {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to acquire {mode} lock on {path}: {source}")]
  Acquire {
    path: PathBuf,
    mode: LockMode,
    #[source]
    source: io::Error,
  },

  #[error("failed to release lock on {path}: {source}")]
  Release {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// An open lock file and the lock mode currently held on it, if any.
///
/// Dropping a `FileLock` releases a held lock and closes the handle.
#[derive(Debug)]
pub struct FileLock {
  file: File,
  path: PathBuf,
  held: Option<LockMode>,
}

impl FileLock {
  /// Opens the lock file at `path`, creating it with permission bits `mode`
  /// if it does not exist. Existing contents are left untouched.
  pub fn open(path: &Path, mode: u32) -> Result<Self, LockError> {
    let file = create_options(mode).open(path).map_err(|source| LockError::Open {
      path: path.to_path_buf(),
      source,
    })?;

    Ok(FileLock {
      file,
      path: path.to_path_buf(),
      held: None,
    })
  }

  /// Blocks until `mode` is obtained. There is no timeout.
  pub fn acquire(&mut self, mode: LockMode) -> Result<(), LockError> {
    debug!(path = %self.path.display(), %mode, "waiting for lock");
    sys::lock(&self.file, mode).map_err(|source| self.acquire_error(mode, source))?;
    self.held = Some(mode);
    debug!(path = %self.path.display(), %mode, "lock acquired");
    Ok(())
  }

  /// Attempts to obtain `mode` without blocking.
  ///
  /// Returns `Ok(false)` if another handle holds a conflicting lock.
  pub fn try_acquire(&mut self, mode: LockMode) -> Result<bool, LockError> {
    match sys::try_lock(&self.file, mode) {
      Ok(()) => {
        self.held = Some(mode);
        debug!(path = %self.path.display(), %mode, "lock acquired");
        Ok(true)
      }
      Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(false),
      Err(err) => Err(self.acquire_error(mode, err)),
    }
  }

  /// Releases the held lock. A no-op when nothing is held.
  pub fn release(&mut self) -> Result<(), LockError> {
    let Some(mode) = self.held else {
      return Ok(());
    };

    sys::unlock(&self.file).map_err(|source| LockError::Release {
      path: self.path.clone(),
      source,
    })?;
    self.held = None;
    debug!(path = %self.path.display(), %mode, "lock released");
    Ok(())
  }

  pub fn mode(&self) -> Option<LockMode> {
    self.held
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn acquire_error(&self, mode: LockMode, source: io::Error) -> LockError {
    LockError::Acquire {
      path: self.path.clone(),
      mode,
      source,
    }
  }
}

impl Drop for FileLock {
  fn drop(&mut self) {
    if let Err(err) = self.release() {
      warn!(error = %err, "failed to release lock on drop");
    }
  }
}
