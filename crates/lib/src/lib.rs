//! dbmkv-lib: a process-safe key-value store over a single file.
//!
//! This crate provides:
//! - `DbmStore`: get/set/delete/prefix-scan over one data file
//! - `Session`: the lock-then-open / close-then-unlock guard every operation runs in
//! - `FileLock`: shared/exclusive OS advisory locks on the companion `.lock` file
//! - `StoreConfig`: data file path and creation mode, passed in explicitly
//!
//! Readers share the lock and run concurrently; writers hold it exclusively.
//! The guarantee holds across independent processes, not only threads, and
//! it is the only concurrency control applied to the data file.

pub mod config;
pub mod consts;
pub mod error;
pub mod lock;
pub mod platform;
pub mod session;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use error::KvError;
pub use lock::{FileLock, LockError, LockMode};
pub use session::{Session, SessionMode, SessionState};
pub use store::{DbmStore, KvBackend};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, KvError>;
