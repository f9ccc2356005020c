//! Entity bindings and the generic table operations built on them.
//!
//! An entity supplies its table layout as constants plus a row mapping in each
//! direction. The helpers here turn that into parameterized SQL; values are
//! always bound, never spliced into statement text.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};

use super::error::{is_missing_table, StorageError};

/// A typed record stored as one row of one table.
pub trait Record: Sized {
    /// Table holding records of this type.
    const TABLE: &'static str;
    /// Primary-key column.
    const KEY_COLUMN: &'static str;
    /// Columns written on insert, in the order of [`Record::to_values`].
    const COLUMNS: &'static [&'static str];
    /// Idempotent DDL creating the table.
    const CREATE_SQL: &'static str;
    /// DDL dropping the table if present.
    const DROP_SQL: &'static str;

    /// Decode one result row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Encode the record as column values, ordered like [`Record::COLUMNS`].
    fn to_values(&self) -> Vec<Value>;
}

/// Create the table for `T` if it does not exist.
pub fn create_table<T: Record>(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(T::CREATE_SQL)?;
    Ok(())
}

/// Drop the table for `T` if it exists.
pub fn drop_table<T: Record>(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(T::DROP_SQL)?;
    Ok(())
}

/// Insert `record`, returning the number of rows written.
pub fn insert_row<T: Record>(conn: &Connection, record: &T) -> Result<usize, StorageError> {
    let placeholders = (1..=T::COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE,
        T::COLUMNS.join(", "),
        placeholders
    );

    conn.execute(&sql, params_from_iter(record.to_values()))
        .map_err(|e| StorageError::from_write(T::TABLE, e))
}

/// Delete rows whose key matches `pattern` under SQL `LIKE`.
///
/// `%` and `_` act as wildcards and ASCII letters compare case-insensitively.
pub fn delete_like<T: Record>(conn: &Connection, pattern: &str) -> Result<usize, StorageError> {
    let sql = format!("DELETE FROM {} WHERE {} LIKE ?1", T::TABLE, T::KEY_COLUMN);
    conn.execute(&sql, params![pattern])
        .map_err(|e| StorageError::from_write(T::TABLE, e))
}

/// Rows whose key equals `key`.
pub fn select_by_key<T: Record>(conn: &Connection, key: &str) -> rusqlite::Result<Vec<T>> {
    let sql = format!("SELECT * FROM {} WHERE {} = ?1", T::TABLE, T::KEY_COLUMN);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![key], |row| T::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every row of the table, in storage order.
pub fn select_all<T: Record>(conn: &Connection) -> rusqlite::Result<Vec<T>> {
    let sql = format!("SELECT * FROM {}", T::TABLE);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| T::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Number of rows in the table.
pub fn count_rows<T: Record>(conn: &Connection) -> rusqlite::Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Run a read, recreating the table if the engine reports it missing.
///
/// A recovered read yields `R::default()`: the table was just created, so
/// there is nothing to return for this call.
pub fn read_or_recreate<T, R, F>(conn: &Connection, query: F) -> Result<R, StorageError>
where
    T: Record,
    R: Default,
    F: FnOnce(&Connection) -> rusqlite::Result<R>,
{
    match query(conn) {
        Ok(rows) => Ok(rows),
        Err(err) if is_missing_table(&err) => {
            tracing::warn!(table = T::TABLE, "Table missing during read, recreating");
            create_table::<T>(conn)?;
            Ok(R::default())
        }
        Err(err) => Err(err.into()),
    }
}

/// Read column `name` as text.
///
/// NULL and absent columns decode to an empty string. Numbers stored in a
/// text column are rendered as text instead of failing the row.
pub fn text_column(row: &Row<'_>, name: &str) -> rusqlite::Result<String> {
    let value = match row.get_ref(name) {
        Ok(value) => value,
        Err(rusqlite::Error::InvalidColumnName(_)) => return Ok(String::new()),
        Err(err) => return Err(err),
    };

    Ok(match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag {
        label: String,
        note: String,
    }

    impl Record for Tag {
        const TABLE: &'static str = "tags";
        const KEY_COLUMN: &'static str = "label";
        const COLUMNS: &'static [&'static str] = &["label", "note"];
        const CREATE_SQL: &'static str =
            "CREATE TABLE IF NOT EXISTS tags (label TEXT PRIMARY KEY, note TEXT)";
        const DROP_SQL: &'static str = "DROP TABLE IF EXISTS tags";

        fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Self {
                label: text_column(row, "label")?,
                note: text_column(row, "note")?,
            })
        }

        fn to_values(&self) -> Vec<Value> {
            vec![
                Value::Text(self.label.clone()),
                Value::Text(self.note.clone()),
            ]
        }
    }

    fn tag(label: &str, note: &str) -> Tag {
        Tag {
            label: label.into(),
            note: note.into(),
        }
    }

    #[test]
    fn test_key_is_bound_not_interpolated() {
        let conn = Connection::open_in_memory().unwrap();
        create_table::<Tag>(&conn).unwrap();
        insert_row(&conn, &tag("a", "first")).unwrap();

        let hostile = "a' OR '1'='1";
        assert!(select_by_key::<Tag>(&conn, hostile).unwrap().is_empty());
        assert_eq!(select_by_key::<Tag>(&conn, "a").unwrap(), vec![tag("a", "first")]);
    }

    #[test]
    fn test_null_and_absent_columns_decode_empty() {
        let conn = Connection::open_in_memory().unwrap();
        // Legacy layout without the note column.
        conn.execute_batch(
            "CREATE TABLE tags (label TEXT PRIMARY KEY); INSERT INTO tags VALUES ('old');",
        )
        .unwrap();
        assert_eq!(select_all::<Tag>(&conn).unwrap(), vec![tag("old", "")]);

        conn.execute_batch("ALTER TABLE tags ADD COLUMN note TEXT").unwrap();
        assert_eq!(select_all::<Tag>(&conn).unwrap(), vec![tag("old", "")]);
    }

    #[test]
    fn test_numeric_values_render_as_text() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE tags (label, note); INSERT INTO tags VALUES (7, 2.5);",
        )
        .unwrap();
        assert_eq!(select_all::<Tag>(&conn).unwrap(), vec![tag("7", "2.5")]);
    }

    #[test]
    fn test_read_or_recreate_restores_table() {
        let conn = Connection::open_in_memory().unwrap();

        let rows: Vec<Tag> = read_or_recreate::<Tag, _, _>(&conn, select_all::<Tag>).unwrap();
        assert!(rows.is_empty());
        assert_eq!(count_rows::<Tag>(&conn).unwrap(), 0);
    }

    #[test]
    fn test_read_or_recreate_propagates_other_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err = read_or_recreate::<Tag, Vec<Tag>, _>(&conn, |c| {
            c.prepare("SELEKT").map(|_| Vec::new())
        })
        .unwrap_err();
        assert!(matches!(err, StorageError::Engine(_)));
    }
}
