pub mod paths;

use std::fs::OpenOptions;

/// Read-write, create-if-missing open options that never truncate.
///
/// On Unix `mode` becomes the permission bits of a newly created file (still
/// subject to the process umask). Elsewhere it is ignored.
pub(crate) fn create_options(mode: u32) -> OpenOptions {
  let mut options = OpenOptions::new();
  options.read(true).write(true).create(true).truncate(false);
  set_create_mode(&mut options, mode);
  options
}

#[cfg(unix)]
fn set_create_mode(options: &mut OpenOptions, mode: u32) {
  use std::os::unix::fs::OpenOptionsExt;
  options.mode(mode);
}

#[cfg(not(unix))]
fn set_create_mode(_options: &mut OpenOptions, _mode: u32) {}
