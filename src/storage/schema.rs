//! Connection pragmas and schema version dispatch.
//!
//! The schema version lives in SQLite's `user_version` header field. Version 0
//! means no store has ever created its schema in this file.

use rusqlite::Connection;
use std::cmp::Ordering;
use std::time::Duration;

use super::contract::SchemaLifecycle;
use super::error::StorageError;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of bringing a database to its target schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTransition {
    /// Stored version already matched; no hook ran.
    Unchanged,
    /// First open: `on_create` materialized the schema.
    Created,
    /// Stored version was older; `on_upgrade` ran.
    Upgraded { from: u32, to: u32 },
    /// Stored version was newer; `on_downgrade` ran.
    Downgraded { from: u32, to: u32 },
}

/// Apply connection pragmas: WAL journal, NORMAL sync and a busy timeout.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    tracing::trace!(journal_mode = %mode, "Applied connection pragmas");
    Ok(())
}

/// Read the schema version recorded in the database header.
pub fn stored_version(conn: &Connection) -> Result<u32, StorageError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Run the lifecycle hook that takes the stored schema to `target`.
///
/// The hook and the version bump share one transaction, so a failing hook
/// leaves both the schema and the recorded version untouched.
pub fn migrate<H>(
    conn: &mut Connection,
    target: u32,
    hooks: &H,
) -> Result<SchemaTransition, StorageError>
where
    H: SchemaLifecycle + ?Sized,
{
    let tx = conn.transaction()?;
    let current = stored_version(&tx)?;

    let transition = if current == 0 {
        hooks.on_create(&tx)?;
        SchemaTransition::Created
    } else {
        match current.cmp(&target) {
            Ordering::Less => {
                hooks.on_upgrade(&tx, current, target)?;
                SchemaTransition::Upgraded {
                    from: current,
                    to: target,
                }
            }
            Ordering::Greater => {
                hooks.on_downgrade(&tx, current, target)?;
                SchemaTransition::Downgraded {
                    from: current,
                    to: target,
                }
            }
            Ordering::Equal => SchemaTransition::Unchanged,
        }
    };

    if transition != SchemaTransition::Unchanged {
        tx.pragma_update(None, "user_version", target)?;
    }
    tx.commit()?;

    Ok(transition)
}
