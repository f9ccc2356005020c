//! Shared persistence handle.
//!
//! A [`Database`] owns exactly one SQLite connection behind a mutex, so every
//! store bound to it gets single-writer access without any locking of its own.
//! Clones share the connection; it is closed when the last clone is dropped.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::contract::SchemaLifecycle;
use super::error::StorageError;
use super::schema::{self, apply_pragmas, SchemaTransition};

/// Connection handle plus the schema version its stores should run at.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    version: u32,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (creating if needed) the database file at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `version` - Target schema version, from 1 to [`MAX_SCHEMA_VERSION`]
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidVersion`] for version 0 or a version
    /// above [`MAX_SCHEMA_VERSION`], and
    /// [`StorageError::Engine`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, version: u32) -> Result<Self, StorageError> {
        validate_version(version)?;
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        apply_pragmas(&conn)?;

        tracing::debug!(path = %path.display(), version, "Opened database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            version,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(version: u32) -> Result<Self, StorageError> {
        validate_version(version)?;
        let conn = Connection::open_in_memory()?;
        apply_pragmas(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            version,
            path: None,
        })
    }

    /// Target schema version of this handle.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Path of the backing file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Schema version currently recorded in the database file.
    pub fn stored_version(&self) -> Result<u32, StorageError> {
        self.with_connection(|conn| schema::stored_version(conn))
    }

    /// Run `f` with exclusive access to the connection.
    ///
    /// A mutex poisoned by a panicking caller is recovered: SQLite rolls back
    /// any statement left unfinished, so the connection itself stays valid.
    pub fn with_connection<R, F>(&self, f: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StorageError>,
    {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut conn)
    }

    /// Bring the schema owned by `hooks` to this handle's version.
    pub fn ensure_schema<H>(&self, hooks: &H) -> Result<SchemaTransition, StorageError>
    where
        H: SchemaLifecycle + ?Sized,
    {
        let target = self.version;
        let transition = self.with_connection(|conn| schema::migrate(conn, target, hooks))?;

        if transition != SchemaTransition::Unchanged {
            tracing::info!(table = hooks.table_name(), ?transition, "Schema lifecycle applied");
        }
        Ok(transition)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("version", &self.version)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Largest version `PRAGMA user_version` (a signed 32-bit field) round-trips.
pub const MAX_SCHEMA_VERSION: u32 = i32::MAX as u32;

fn validate_version(version: u32) -> Result<(), StorageError> {
    if version == 0 || version > MAX_SCHEMA_VERSION {
        return Err(StorageError::InvalidVersion(version));
    }
    Ok(())
}
