//! Users command implementation.
//!
//! Every command runs through a store worker, the same way a long-running
//! embedding application would share one store between tasks.

use anyhow::{Context, Result};
use recstore::config::Config;
use recstore::storage::{StoreWorker, WorkerHandle};
use recstore::{UserRecord, UserRecordStore};
use serde::Serialize;

use super::open_database;
use crate::OutputFormat;

#[derive(Serialize)]
struct UsersOutput {
    users: Vec<UserRecord>,
    total: usize,
}

#[derive(Serialize)]
struct ChangeOutput {
    operation: &'static str,
    key: String,
    success: bool,
}

/// A user store running on its worker thread for the length of one command.
struct Session {
    worker: StoreWorker<UserRecord>,
    handle: WorkerHandle<UserRecord>,
}

impl Session {
    fn start(config: &Config) -> Result<Self> {
        let db = open_database(config)?;
        let store = UserRecordStore::open(db).context("failed to open user store")?;
        let worker = StoreWorker::spawn(store, config.channel_size)
            .context("failed to start store worker")?;
        let handle = worker.handle();
        Ok(Self { worker, handle })
    }

    /// Shut the worker down and wait for its thread.
    ///
    /// Commands call this before looking at their request's result, so a
    /// failed request still releases the database before the error surfaces.
    async fn finish(self) -> Result<()> {
        self.handle.shutdown().await?;
        self.worker.join()?;
        Ok(())
    }
}

pub async fn insert(
    config: &Config,
    id: String,
    name: String,
    age: String,
    format: OutputFormat,
) -> Result<()> {
    let session = Session::start(config)?;
    let record = UserRecord::new(id.clone(), name, age);

    let result = session.handle.insert(record).await;
    let finished = session.finish().await;
    let success = result.with_context(|| format!("failed to insert user '{}'", id))?;
    finished?;

    print_change("insert", id, success, format)
}

pub async fn get(config: &Config, id: String, format: OutputFormat) -> Result<()> {
    let session = Session::start(config)?;
    let result = session.handle.read(id.clone()).await;
    let finished = session.finish().await;
    let users = result.with_context(|| format!("failed to read user '{}'", id))?;
    finished?;

    print_users(users, format)
}

pub async fn list(config: &Config, format: OutputFormat) -> Result<()> {
    let session = Session::start(config)?;
    let result = session.handle.read_all().await;
    let finished = session.finish().await;
    let users = result.context("failed to list users")?;
    finished?;

    print_users(users, format)
}

pub async fn delete(config: &Config, key: String, format: OutputFormat) -> Result<()> {
    let session = Session::start(config)?;
    let result = session.handle.delete_by_string_key(key.clone()).await;
    let finished = session.finish().await;
    let success = result.with_context(|| format!("failed to delete users matching '{}'", key))?;
    finished?;

    print_change("delete", key, success, format)
}

pub async fn delete_id(config: &Config, id: i64, format: OutputFormat) -> Result<()> {
    let session = Session::start(config)?;
    let result = session.handle.delete_by_integer_key(id).await;
    let finished = session.finish().await;
    let success = result.with_context(|| format!("failed to delete user {}", id))?;
    finished?;

    print_change("delete-id", id.to_string(), success, format)
}

fn print_users(users: Vec<UserRecord>, format: OutputFormat) -> Result<()> {
    let output = UsersOutput {
        total: users.len(),
        users,
    };

    match format {
        OutputFormat::Text => {
            if output.users.is_empty() {
                println!("No users found.");
            } else {
                println!("{:<24} {:<32} {:>8}", "ID", "NAME", "AGE");
                println!("{}", "-".repeat(66));
                for user in &output.users {
                    println!("{:<24} {:<32} {:>8}", user.user_id, user.name, user.age);
                }
                println!();
                println!("Total: {} user(s)", output.total);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn print_change(
    operation: &'static str,
    key: String,
    success: bool,
    format: OutputFormat,
) -> Result<()> {
    let output = ChangeOutput {
        operation,
        key,
        success,
    };

    match format {
        OutputFormat::Text => {
            if output.success {
                println!("{} '{}': ok", output.operation, output.key);
            } else {
                println!("{} '{}': not supported", output.operation, output.key);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
