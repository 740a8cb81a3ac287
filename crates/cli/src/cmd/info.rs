use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use dbmkv_lib::DbmStore;
use dbmkv_lib::lock::PRIMITIVE;

use crate::output::{OutputFormat, format_bytes, print_json, print_stat};

#[derive(Serialize)]
struct InfoOutput {
  path: PathBuf,
  lock_path: PathBuf,
  mode: String,
  exists: bool,
  size: Option<u64>,
  lock_primitive: &'static str,
}

pub fn cmd_info(store: &DbmStore, output: OutputFormat) -> Result<()> {
  let size = std::fs::metadata(store.path()).ok().map(|m| m.len());
  debug!(path = %store.path().display(), exists = size.is_some(), "inspected store");
  let info = InfoOutput {
    path: store.path().to_path_buf(),
    lock_path: store.lock_path(),
    mode: format!("{:04o}", store.config().mode),
    exists: size.is_some(),
    size,
    lock_primitive: PRIMITIVE,
  };

  if output.is_json() {
    return print_json(&info);
  }

  println!("Store:");
  print_stat("Data file", &info.path.display().to_string());
  print_stat("Lock file", &info.lock_path.display().to_string());
  print_stat("Mode", &info.mode);
  match info.size {
    Some(size) => print_stat("Size", &format_bytes(size)),
    None => print_stat("Size", "not created yet"),
  }
  print_stat("Locking", info.lock_primitive);

  Ok(())
}
