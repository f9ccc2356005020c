//! SQLite storage layer for recstore.
//!
//! Provides:
//! - A mutex-guarded connection handle carrying the target schema version
//! - Schema lifecycle dispatch (create, upgrade, downgrade)
//! - The generic record store contract and entity bindings
//! - The user record store
//! - A dedicated worker thread that serializes store requests

pub mod contract;
pub mod database;
pub mod error;
pub mod record;
pub mod schema;
pub mod users;
pub mod worker;

pub use contract::{RecordStore, SchemaLifecycle};
pub use database::{Database, MAX_SCHEMA_VERSION};
pub use error::StorageError;
pub use record::Record;
pub use schema::SchemaTransition;
pub use users::{UserRecord, UserRecordStore};
pub use worker::{StoreWorker, WorkerError, WorkerHandle};

/// Schema version used when the embedding application does not pick one.
pub const DEFAULT_SCHEMA_VERSION: u32 = 1;
