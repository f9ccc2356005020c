//! Test utilities for recstore integration tests.
//!
//! Provides:
//! - Temporary on-disk database fixtures
//! - Helpers for opening user stores at a given schema version
//! - Out-of-band table manipulation that bypasses the store

#![allow(dead_code)]

use recstore::{Database, UserRecord, UserRecordStore};
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that manages a temporary database directory.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary directory for test database
    pub temp_dir: TempDir,
    /// Path to the database file
    pub db_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with a temporary database directory.
    pub fn new() -> Self {
        recstore::observability::tracing::init_test_tracing();
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        Self { temp_dir, db_path }
    }

    /// Open the user store on this fixture's file at `version`.
    pub fn users(&self, version: u32) -> UserRecordStore {
        let db = Database::open(&self.db_path, version).expect("failed to open database");
        UserRecordStore::open(db).expect("failed to open user store")
    }

    /// Drop the users table behind the store's back, as another process might.
    pub fn drop_users_table(&self) {
        let conn = Connection::open(&self.db_path).expect("failed to open raw connection");
        conn.execute_batch("DROP TABLE users")
            .expect("failed to drop users table");
    }

    /// Whether the users table currently exists.
    pub fn users_table_exists(&self) -> bool {
        let conn = Connection::open(&self.db_path).expect("failed to open raw connection");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
                [],
                |row| row.get(0),
            )
            .expect("failed to query sqlite_master");
        count == 1
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for building a user record.
pub fn user(id: &str, name: &str, age: &str) -> UserRecord {
    UserRecord::new(id, name, age)
}

/// Sorted user ids, for order-independent comparisons.
pub fn ids(users: &[UserRecord]) -> Vec<String> {
    let mut ids: Vec<String> = users.iter().map(|u| u.user_id.clone()).collect();
    ids.sort();
    ids
}
