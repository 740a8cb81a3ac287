use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use dbmkv_lib::KvBackend;

use crate::output::{OutputFormat, print_json, print_success};

#[derive(Serialize)]
struct DeleteOutput<'a> {
  deleted: &'a [String],
}

pub fn cmd_delete(store: &impl KvBackend, keys: &[String], output: OutputFormat) -> Result<()> {
  let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
  store.delete(&refs).context("Failed to delete keys")?;
  debug!(count = keys.len(), "delete");

  if output.is_json() {
    print_json(&DeleteOutput { deleted: keys })?;
  } else {
    print_success(&format!("Deleted {} key(s)", keys.len()));
  }

  Ok(())
}
