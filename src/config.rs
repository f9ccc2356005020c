//! Configuration parsing for recstore.
//!
//! Supports:
//! - CLI arguments via clap (flattened into the embedding binary's parser)
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Args;
use std::path::PathBuf;

use crate::storage::DEFAULT_SCHEMA_VERSION;

/// Store configuration shared by every embedding application.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    #[arg(long, env = "RECSTORE_DB_PATH", default_value = "./data/recstore.db")]
    pub db_path: PathBuf,

    /// Target schema version (1 to 2147483647); a different stored version triggers upgrade or downgrade
    #[arg(long, env = "RECSTORE_SCHEMA_VERSION", default_value_t = DEFAULT_SCHEMA_VERSION)]
    pub schema_version: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Size of the store worker request channel
    #[arg(long, env = "RECSTORE_CHANNEL_SIZE", default_value_t = 64)]
    pub channel_size: usize,
}

impl Config {
    /// Create a configuration for testing against the given database file.
    #[cfg(test)]
    pub fn test_config(db_path: PathBuf) -> Self {
        Self {
            db_path,
            schema_version: DEFAULT_SCHEMA_VERSION,
            log_level: "debug".into(),
            channel_size: 8,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/recstore.db"),
            schema_version: DEFAULT_SCHEMA_VERSION,
            log_level: "warn".into(),
            channel_size: 64,
        }
    }
}
