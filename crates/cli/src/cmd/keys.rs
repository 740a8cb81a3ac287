use anyhow::{Context, Result};
use tracing::debug;

use dbmkv_lib::KvBackend;

use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_keys(store: &impl KvBackend, prefix: &str, output: OutputFormat) -> Result<()> {
  let mut keys = store
    .scan_prefix(prefix)
    .with_context(|| format!("Failed to list keys with prefix '{}'", prefix))?;
  keys.sort();
  debug!(prefix, count = keys.len(), "scan");

  if output.is_json() {
    print_json(&keys)?;
  } else if keys.is_empty() {
    print_info("No matching keys");
  } else {
    for key in &keys {
      println!("{}", key);
    }
  }

  Ok(())
}
