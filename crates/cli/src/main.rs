mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dbmkv_lib::config::parse_mode;
use dbmkv_lib::{DbmStore, StoreConfig};

use crate::cmd::{cmd_delete, cmd_get, cmd_info, cmd_keys, cmd_set};
use crate::output::OutputFormat;

/// dbmkv - process-safe key-value store over a single file
#[derive(Parser)]
#[command(name = "dbmkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Data file path (default: $DBMKV_FILE, then the platform data directory)
  #[arg(long, global = true)]
  file: Option<PathBuf>,

  /// Octal permission mode for newly created files (default: $DBMKV_MODE, then 644)
  #[arg(long, global = true, value_parser = parse_mode)]
  mode: Option<u32>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the value stored under a key
  Get {
    /// Key to look up
    key: String,
  },

  /// Store a value under a key
  Set {
    /// Key to write
    key: String,

    /// Value to store
    #[arg(required_unless_present = "from_file", conflicts_with = "from_file")]
    value: Option<String>,

    /// Read the value bytes from a file instead
    #[arg(long)]
    from_file: Option<PathBuf>,
  },

  /// Delete keys; keys that are not stored are ignored
  Delete {
    /// Keys to delete
    #[arg(required = true)]
    keys: Vec<String>,
  },

  /// List keys starting with a prefix
  Keys {
    /// Key prefix (default: all keys)
    #[arg(default_value = "")]
    prefix: String,
  },

  /// Show store locations and settings
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let store = DbmStore::new(resolve_config(cli.file, cli.mode)?);

  match cli.command {
    Commands::Get { key } => cmd_get(&store, &key, cli.output),
    Commands::Set { key, value, from_file } => cmd_set(&store, &key, value, from_file, cli.output),
    Commands::Delete { keys } => cmd_delete(&store, &keys, cli.output),
    Commands::Keys { prefix } => cmd_keys(&store, &prefix, cli.output),
    Commands::Info => cmd_info(&store, cli.output),
  }
}

/// Environment first, then command-line overrides.
fn resolve_config(file: Option<PathBuf>, mode: Option<u32>) -> Result<StoreConfig> {
  let mut config = StoreConfig::from_env().context("Invalid store configuration in environment")?;
  if let Some(file) = file {
    config.path = file;
  }
  if let Some(mode) = mode {
    config.mode = mode;
  }
  debug!(path = %config.path.display(), mode = format_args!("{:o}", config.mode), "resolved store config");
  Ok(config)
}
