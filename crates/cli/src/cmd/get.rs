use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use dbmkv_lib::KvBackend;

use crate::output::{OutputFormat, print_error, print_json};

#[derive(Serialize)]
struct GetOutput<'a> {
  key: &'a str,
  found: bool,
  value: Option<String>,
}

/// Writes the raw value bytes to stdout. Exits with status 1 if the key is absent.
pub fn cmd_get(store: &impl KvBackend, key: &str, output: OutputFormat) -> Result<()> {
  let value = store
    .get(key)
    .with_context(|| format!("Failed to read key '{}'", key))?;

  debug!(key, found = value.is_some(), "get");

  if output.is_json() {
    print_json(&GetOutput {
      key,
      found: value.is_some(),
      value: value.as_deref().map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
    })?;
  } else if let Some(bytes) = &value {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
  } else {
    print_error(&format!("Key not found: {}", key));
  }

  if value.is_none() {
    std::process::exit(1);
  }
  Ok(())
}
