//! Error kinds surfaced by record stores.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Error type for store operations.
///
/// A table found missing during a read is not represented here: reads
/// recover from it in place and report zero rows.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An insert collided with an existing primary key or carried an empty one.
    #[error("Constraint violation on table '{table}': {message}")]
    ConstraintViolation {
        table: &'static str,
        message: String,
    },

    /// The engine rejected a query or DDL statement (I/O, corruption, bad SQL).
    #[error("Storage engine error: {0}")]
    Engine(#[from] rusqlite::Error),

    /// Version 0 marks a database whose schema was never created, and
    /// `user_version` cannot hold anything above `i32::MAX`.
    #[error("Invalid schema version {0}: versions range from 1 to 2147483647")]
    InvalidVersion(u32),
}

impl StorageError {
    /// Classify an engine error raised while writing to `table`.
    ///
    /// Constraint failures become [`StorageError::ConstraintViolation`];
    /// everything else is passed through as [`StorageError::Engine`].
    pub(crate) fn from_write(table: &'static str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation {
                    table,
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                }
            }
            other => Self::Engine(other),
        }
    }

    /// Whether this error is a rejected key.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

/// Detect the engine's "table does not exist" failure.
///
/// SQLite reports it as a generic error whose message starts with
/// `no such table`, so the message is the only reliable signal.
pub(crate) fn is_missing_table(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message.starts_with("no such table"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_missing_table_detected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.prepare("SELECT * FROM nowhere").unwrap_err();
        assert!(is_missing_table(&err));
    }

    #[test]
    fn test_syntax_error_is_not_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.prepare("SELEKT 1").unwrap_err();
        assert!(!is_missing_table(&err));
    }

    #[test]
    fn test_duplicate_key_classified_as_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();

        let classified = StorageError::from_write("t", err);
        assert!(classified.is_constraint_violation());
        assert!(classified.to_string().contains("'t'"));
    }

    #[test]
    fn test_other_write_errors_stay_engine_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("INSERT INTO missing VALUES (1)", []).unwrap_err();
        assert!(matches!(
            StorageError::from_write("missing", err),
            StorageError::Engine(_)
        ));
    }
}
