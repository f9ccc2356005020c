//! User record store.
//!
//! The users table is a disposable cache of externally sourced data: any
//! schema version change drops it and starts over empty.

use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use super::contract::{RecordStore, SchemaLifecycle};
use super::database::Database;
use super::error::StorageError;
use super::record::{self, text_column, Record};
use super::schema::SchemaTransition;

/// A user as cached by the store. `age` is kept as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub age: String,
}

impl UserRecord {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        age: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            age: age.into(),
        }
    }
}

impl Record for UserRecord {
    const TABLE: &'static str = "users";
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "name", "age"];
    const CREATE_SQL: &'static str =
        "CREATE TABLE IF NOT EXISTS users (id TEXT PRIMARY KEY, name TEXT, age TEXT)";
    const DROP_SQL: &'static str = "DROP TABLE IF EXISTS users";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: text_column(row, "id")?,
            name: text_column(row, "name")?,
            age: text_column(row, "age")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.user_id.clone()),
            Value::Text(self.name.clone()),
            Value::Text(self.age.clone()),
        ]
    }
}

/// [`RecordStore`] for [`UserRecord`], bound to a shared [`Database`].
#[derive(Debug, Clone)]
pub struct UserRecordStore {
    db: Database,
    transition: SchemaTransition,
}

impl UserRecordStore {
    /// Bind a store to `db` and bring the users schema to the handle's version.
    pub fn open(db: Database) -> Result<Self, StorageError> {
        let mut store = Self {
            db,
            transition: SchemaTransition::Unchanged,
        };
        store.transition = store.db.ensure_schema(&store)?;
        Ok(store)
    }

    /// What the schema lifecycle did when this store was bound.
    pub fn transition(&self) -> SchemaTransition {
        self.transition
    }

    /// The handle this store runs on.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Number of stored users. Recreates a missing table like [`RecordStore::read_all`].
    pub fn count(&self) -> Result<usize, StorageError> {
        self.db.with_connection(|conn| {
            record::read_or_recreate::<UserRecord, _, _>(conn, record::count_rows::<UserRecord>)
        })
    }

    fn recreate(&self, conn: &Connection) -> Result<(), StorageError> {
        record::drop_table::<UserRecord>(conn)?;
        self.on_create(conn)
    }
}

impl SchemaLifecycle for UserRecordStore {
    fn table_name(&self) -> &'static str {
        UserRecord::TABLE
    }

    fn on_create(&self, conn: &Connection) -> Result<(), StorageError> {
        record::create_table::<UserRecord>(conn)
    }

    fn on_upgrade(
        &self,
        conn: &Connection,
        old_version: u32,
        new_version: u32,
    ) -> Result<(), StorageError> {
        tracing::info!(
            old_version,
            new_version,
            "Discarding cached users on schema upgrade"
        );
        self.recreate(conn)
    }

    fn on_downgrade(
        &self,
        conn: &Connection,
        old_version: u32,
        new_version: u32,
    ) -> Result<(), StorageError> {
        self.on_upgrade(conn, old_version, new_version)
    }
}

impl RecordStore<UserRecord> for UserRecordStore {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.user_id))]
    fn insert(&self, user: &UserRecord) -> Result<bool, StorageError> {
        if user.user_id.is_empty() {
            return Err(StorageError::ConstraintViolation {
                table: UserRecord::TABLE,
                message: "empty key".into(),
            });
        }
        self.db.with_connection(|conn| record::insert_row(conn, user))?;
        tracing::debug!("User inserted");
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    fn delete_by_string_key(&self, key: &str) -> Result<bool, StorageError> {
        let deleted = self
            .db
            .with_connection(|conn| record::delete_like::<UserRecord>(conn, key))?;
        tracing::debug!(deleted, "Users deleted");
        Ok(true)
    }

    fn delete_by_integer_key(&self, key: i64) -> Result<bool, StorageError> {
        tracing::debug!(key, "Integer keys are not used by the users table");
        Ok(false)
    }

    fn read(&self, key: &str) -> Result<Vec<UserRecord>, StorageError> {
        self.db.with_connection(|conn| {
            record::read_or_recreate::<UserRecord, _, _>(conn, |conn| {
                record::select_by_key::<UserRecord>(conn, key)
            })
        })
    }

    fn read_all(&self) -> Result<Vec<UserRecord>, StorageError> {
        self.db.with_connection(|conn| {
            record::read_or_recreate::<UserRecord, _, _>(conn, record::select_all::<UserRecord>)
        })
    }
}
