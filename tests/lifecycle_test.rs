//! Schema lifecycle tests.
//!
//! Tests:
//! - First open creates the schema and records the version
//! - Reopening at a higher version upgrades destructively
//! - Reopening at a lower version downgrades destructively
//! - Reopening at the same version keeps data

mod common;

use common::{user, TestFixture};
use recstore::storage::MAX_SCHEMA_VERSION;
use recstore::{Database, RecordStore, SchemaTransition, StorageError, UserRecordStore};

#[test]
fn test_first_open_creates_schema() {
    let fixture = TestFixture::new();
    let db = Database::open(&fixture.db_path, 1).unwrap();
    assert_eq!(db.stored_version().unwrap(), 0);

    let store = UserRecordStore::open(db).unwrap();

    assert!(fixture.users_table_exists());
    assert_eq!(store.database().stored_version().unwrap(), 1);
}

#[test]
fn test_reopen_same_version_keeps_rows() {
    let fixture = TestFixture::new();
    {
        let store = fixture.users(1);
        store.insert(&user("u1", "Ann", "30")).unwrap();
    }

    let store = fixture.users(1);
    assert_eq!(store.read_all().unwrap(), vec![user("u1", "Ann", "30")]);
}

#[test]
fn test_upgrade_discards_rows() {
    let fixture = TestFixture::new();
    {
        let store = fixture.users(1);
        store.insert(&user("u1", "Ann", "30")).unwrap();
    }

    let store = fixture.users(2);

    assert_eq!(store.transition(), SchemaTransition::Upgraded { from: 1, to: 2 });
    assert!(store.read_all().unwrap().is_empty());
    assert_eq!(store.database().stored_version().unwrap(), 2);
    // The recreated table is usable.
    store.insert(&user("u1", "Ann", "31")).unwrap();
}

#[test]
fn test_downgrade_discards_rows() {
    let fixture = TestFixture::new();
    {
        let store = fixture.users(3);
        store.insert(&user("u1", "Ann", "30")).unwrap();
    }

    let store = fixture.users(1);

    assert_eq!(store.transition(), SchemaTransition::Downgraded { from: 3, to: 1 });
    assert!(store.read_all().unwrap().is_empty());
    assert_eq!(store.database().stored_version().unwrap(), 1);
}

#[test]
fn test_ensure_schema_reports_transitions() {
    let fixture = TestFixture::new();
    let store = fixture.users(1);
    assert_eq!(
        store.database().ensure_schema(&store).unwrap(),
        SchemaTransition::Unchanged
    );

    let upgraded = Database::open(&fixture.db_path, 5).unwrap();
    assert_eq!(
        upgraded.ensure_schema(&store).unwrap(),
        SchemaTransition::Upgraded { from: 1, to: 5 }
    );

    let downgraded = Database::open(&fixture.db_path, 2).unwrap();
    assert_eq!(
        downgraded.ensure_schema(&store).unwrap(),
        SchemaTransition::Downgraded { from: 5, to: 2 }
    );
}

#[test]
fn test_upgrade_recreates_missing_table() {
    let fixture = TestFixture::new();
    drop(fixture.users(1));
    fixture.drop_users_table();

    let store = fixture.users(2);

    assert!(fixture.users_table_exists());
    assert!(store.read_all().unwrap().is_empty());
}

#[test]
fn test_version_above_user_version_range_is_rejected() {
    let fixture = TestFixture::new();
    {
        let store = fixture.users(1);
        store.insert(&user("u1", "Ann", "30")).unwrap();
    }

    let err = Database::open(&fixture.db_path, 3_000_000_000).unwrap_err();
    assert!(matches!(err, StorageError::InvalidVersion(3_000_000_000)));

    // Nothing was written, so the cached row is still governed by version 1.
    let store = fixture.users(1);
    assert_eq!(store.transition(), SchemaTransition::Unchanged);
    assert_eq!(store.database().stored_version().unwrap(), 1);
}

#[test]
fn test_highest_version_round_trips_through_reopen() {
    let fixture = TestFixture::new();
    {
        let store = fixture.users(MAX_SCHEMA_VERSION);
        store.insert(&user("u1", "Ann", "30")).unwrap();
    }

    let store = fixture.users(1);

    assert_eq!(
        store.transition(),
        SchemaTransition::Downgraded {
            from: MAX_SCHEMA_VERSION,
            to: 1
        }
    );
    assert!(store.read_all().unwrap().is_empty());
}

#[test]
fn test_version_zero_is_rejected() {
    let fixture = TestFixture::new();
    let err = Database::open(&fixture.db_path, 0).unwrap_err();
    assert!(matches!(err, StorageError::InvalidVersion(0)));
}
