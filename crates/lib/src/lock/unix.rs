use std::fs::File;
use std::io;
use std::os::unix::io::AsFd;

use rustix::fs::{FlockOperation, flock};
use rustix::io::Errno;

use super::LockMode;

pub(super) const PRIMITIVE: &str = "flock";

pub(super) fn lock(file: &File, mode: LockMode) -> io::Result<()> {
  let operation = match mode {
    LockMode::Shared => FlockOperation::LockShared,
    LockMode::Exclusive => FlockOperation::LockExclusive,
  };
  retry_on_interrupt(file, operation)
}

pub(super) fn try_lock(file: &File, mode: LockMode) -> io::Result<()> {
  let operation = match mode {
    LockMode::Shared => FlockOperation::NonBlockingLockShared,
    LockMode::Exclusive => FlockOperation::NonBlockingLockExclusive,
  };
  retry_on_interrupt(file, operation)
}

pub(super) fn unlock(file: &File) -> io::Result<()> {
  retry_on_interrupt(file, FlockOperation::Unlock)
}

// A blocking flock returns EINTR when a signal arrives mid-wait.
fn retry_on_interrupt(file: &File, operation: FlockOperation) -> io::Result<()> {
  loop {
    match flock(file.as_fd(), operation) {
      Ok(()) => return Ok(()),
      Err(Errno::INTR) => continue,
      Err(e) => return Err(io::Error::from_raw_os_error(e.raw_os_error())),
    }
  }
}
