//! Recstore: a versioned, self-healing SQLite record store.
//!
//! Each entity type owns one table. Stores evolve their schema through
//! create/upgrade/downgrade hooks keyed on `PRAGMA user_version`, translate
//! between typed records and rows, and recreate a missing table on read.
//!
//! # Architecture
//!
//! - **Contract**: [`storage::RecordStore`] over any entity type
//! - **Entity binding**: [`storage::Record`] supplies table, columns and row mapping
//! - **Disposable cache**: version changes drop and recreate the table
//! - **Serialized access**: one mutex-guarded connection, or a worker thread
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`observability`]: Tracing setup
//! - [`storage`]: Database handle, schema lifecycle, stores and worker

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // storage::StorageError is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc,         // Panic docs can be verbose
    clippy::needless_raw_string_hashes  // r#""# is fine for SQL
)]

pub mod config;
pub mod observability;
pub mod storage;

pub use storage::{
    Database, Record, RecordStore, SchemaLifecycle, SchemaTransition, StorageError, UserRecord,
    UserRecordStore,
};
