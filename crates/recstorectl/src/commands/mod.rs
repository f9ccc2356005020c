//! Command implementations.

pub mod schema;
pub mod users;

use anyhow::{Context, Result};
use recstore::config::Config;
use recstore::Database;
use std::fs;

/// Open the configured database file, creating its directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }

    tracing::debug!(
        path = %config.db_path.display(),
        version = config.schema_version,
        "Opening database"
    );
    Database::open(&config.db_path, config.schema_version)
        .with_context(|| format!("failed to open database: {}", config.db_path.display()))
}
