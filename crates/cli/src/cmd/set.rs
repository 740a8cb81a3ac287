use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::debug;

use dbmkv_lib::KvBackend;

use crate::output::{OutputFormat, format_bytes, print_json, print_success};

#[derive(Serialize)]
struct SetOutput<'a> {
  key: &'a str,
  bytes: usize,
}

pub fn cmd_set(
  store: &impl KvBackend,
  key: &str,
  value: Option<String>,
  from_file: Option<PathBuf>,
  output: OutputFormat,
) -> Result<()> {
  let bytes = match (value, from_file) {
    (Some(value), None) => value.into_bytes(),
    (None, Some(path)) => std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?,
    _ => bail!("Provide either a value or --from-file"),
  };

  store
    .set(key, &bytes)
    .with_context(|| format!("Failed to store key '{}'", key))?;
  debug!(key, len = bytes.len(), "set");

  if output.is_json() {
    print_json(&SetOutput { key, bytes: bytes.len() })?;
  } else {
    print_success(&format!("Stored {} ({})", key, format_bytes(bytes.len() as u64)));
  }

  Ok(())
}
