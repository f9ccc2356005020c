//! Schema command implementation.

use anyhow::{Context, Result};
use recstore::config::Config;
use recstore::{SchemaTransition, UserRecordStore};
use serde::Serialize;

use super::open_database;
use crate::OutputFormat;

#[derive(Serialize)]
struct VersionOutput {
    db_path: String,
    stored_version: u32,
    target_version: u32,
    pending: bool,
}

#[derive(Serialize)]
struct MigrateOutput {
    db_path: String,
    transition: String,
    version: u32,
}

/// Report versions without running any lifecycle hook.
pub fn version(config: &Config, format: OutputFormat) -> Result<()> {
    let db = open_database(config)?;
    let stored_version = db
        .stored_version()
        .context("failed to read stored schema version")?;

    let output = VersionOutput {
        db_path: config.db_path.display().to_string(),
        stored_version,
        target_version: db.version(),
        pending: stored_version != db.version(),
    };

    match format {
        OutputFormat::Text => {
            println!("Database:       {}", output.db_path);
            println!("Stored version: {}", output.stored_version);
            println!("Target version: {}", output.target_version);
            if output.pending {
                println!("Schema change pending; cached users will be discarded.");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Bind the users store, which applies the lifecycle, and report what ran.
pub fn migrate(config: &Config, format: OutputFormat) -> Result<()> {
    let db = open_database(config)?;
    let store = UserRecordStore::open(db).context("failed to migrate user store")?;

    let transition = match store.transition() {
        SchemaTransition::Unchanged => "unchanged".to_string(),
        SchemaTransition::Created => "created".to_string(),
        SchemaTransition::Upgraded { from, to } => format!("upgraded {} -> {}", from, to),
        SchemaTransition::Downgraded { from, to } => format!("downgraded {} -> {}", from, to),
    };
    let output = MigrateOutput {
        db_path: config.db_path.display().to_string(),
        transition,
        version: store.database().version(),
    };

    match format {
        OutputFormat::Text => {
            println!(
                "{}: {} (now at version {})",
                output.db_path, output.transition, output.version
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
