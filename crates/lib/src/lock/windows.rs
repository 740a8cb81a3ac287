use std::fs::File;
use std::io;
use std::os::windows::io::AsRawHandle;

use windows_sys::Win32::Foundation::{ERROR_LOCK_VIOLATION, HANDLE};
use windows_sys::Win32::Storage::FileSystem::{
  LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx, UnlockFile,
};
use windows_sys::Win32::System::IO::OVERLAPPED;

use super::LockMode;

pub(super) const PRIMITIVE: &str = "LockFileEx";

pub(super) fn lock(file: &File, mode: LockMode) -> io::Result<()> {
  lock_first_byte(file, mode_flags(mode))
}

pub(super) fn try_lock(file: &File, mode: LockMode) -> io::Result<()> {
  lock_first_byte(file, mode_flags(mode) | LOCKFILE_FAIL_IMMEDIATELY).map_err(|err| {
    if err.raw_os_error() == Some(ERROR_LOCK_VIOLATION as i32) {
      io::Error::from(io::ErrorKind::WouldBlock)
    } else {
      err
    }
  })
}

pub(super) fn unlock(file: &File) -> io::Result<()> {
  let handle = file.as_raw_handle() as HANDLE;

  // SAFETY: the handle is owned by `file` and stays valid for the call.
  let result = unsafe { UnlockFile(handle, 0, 0, 1, 0) };

  if result == 0 {
    Err(io::Error::last_os_error())
  } else {
    Ok(())
  }
}

fn mode_flags(mode: LockMode) -> u32 {
  match mode {
    LockMode::Shared => 0,
    LockMode::Exclusive => LOCKFILE_EXCLUSIVE_LOCK,
  }
}

fn lock_first_byte(file: &File, flags: u32) -> io::Result<()> {
  let handle = file.as_raw_handle() as HANDLE;

  // SAFETY: OVERLAPPED is a plain data struct that is valid when zero-initialized.
  // LockFileEx is safe to call with a valid file handle and zeroed OVERLAPPED.
  let result = unsafe {
    let mut overlapped: OVERLAPPED = std::mem::zeroed();
    LockFileEx(handle, flags, 0, 1, 0, &mut overlapped)
  };

  if result == 0 {
    Err(io::Error::last_os_error())
  } else {
    Ok(())
  }
}
