//! The record store contract.
//!
//! Every entity-specific store implements [`RecordStore`] so embedding code can
//! treat stores uniformly. Key-type-specific operations are separate named
//! methods; a store whose entity does not use a key type still implements the
//! method and reports `false`.

use rusqlite::Connection;

use super::error::StorageError;

/// Schema lifecycle hooks, invoked by [`Database::ensure_schema`].
///
/// Embedding applications never call these directly; the handle's version
/// check decides which one runs.
///
/// [`Database::ensure_schema`]: super::Database::ensure_schema
pub trait SchemaLifecycle {
    /// Name of the table this store owns.
    fn table_name(&self) -> &'static str;

    /// Materialize the schema. Must be idempotent.
    fn on_create(&self, conn: &Connection) -> Result<(), StorageError>;

    /// Move the schema from `old_version` up to `new_version`.
    fn on_upgrade(
        &self,
        conn: &Connection,
        old_version: u32,
        new_version: u32,
    ) -> Result<(), StorageError>;

    /// Move the schema from `old_version` down to `new_version`.
    fn on_downgrade(
        &self,
        conn: &Connection,
        old_version: u32,
        new_version: u32,
    ) -> Result<(), StorageError>;
}

/// CRUD operations over records of type `T`.
pub trait RecordStore<T>: SchemaLifecycle {
    /// Insert one record.
    ///
    /// Fails with [`StorageError::ConstraintViolation`] if the key exists.
    fn insert(&self, record: &T) -> Result<bool, StorageError>;

    /// Delete every record whose string key matches `key`.
    ///
    /// Reports `true` even when nothing matched.
    fn delete_by_string_key(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete the record with integer key `key`.
    ///
    /// Stores keyed by strings return `Ok(false)`.
    fn delete_by_integer_key(&self, key: i64) -> Result<bool, StorageError>;

    /// Records whose key equals `key`.
    fn read(&self, key: &str) -> Result<Vec<T>, StorageError>;

    /// Every stored record, in storage order.
    fn read_all(&self) -> Result<Vec<T>, StorageError>;
}
