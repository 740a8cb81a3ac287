/// Application name used for default data locations.
pub const APP_NAME: &str = "dbmkv";

/// Suffix appended to the data file path to name its companion lock file.
pub const LOCK_SUFFIX: &str = ".lock";

/// File name of the store inside the data directory when no path is configured.
pub const DEFAULT_FILENAME: &str = "kvstore";

/// Permission bits applied when the data file is first created.
pub const DEFAULT_MODE: u32 = 0o644;

/// Environment variable overriding the data file path.
pub const FILE_ENV: &str = "DBMKV_FILE";

/// Environment variable overriding the creation mode (octal).
pub const MODE_ENV: &str = "DBMKV_MODE";
