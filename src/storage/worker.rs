//! Dedicated store thread.
//!
//! A [`StoreWorker`] owns one store and applies requests strictly in arrival
//! order, so the store never sees concurrent calls. Async callers talk to it
//! through a cloneable [`WorkerHandle`]; each request carries a oneshot reply
//! channel.
//!
//! A store that panics stops the worker: the request being served and every
//! request still queued fail with [`WorkerError::ThreadPanic`], later requests
//! fail with [`WorkerError::ChannelClosed`], and [`StoreWorker::join`] reports
//! the panic.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::contract::RecordStore;
use super::error::StorageError;

/// Error type for worker operations.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Store worker channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Store worker thread panicked")]
    ThreadPanic,
}

type Reply<R> = oneshot::Sender<Result<R, WorkerError>>;

/// Requests accepted by the worker thread.
enum Command<T> {
    Insert { record: T, reply: Reply<bool> },
    DeleteByStringKey { key: String, reply: Reply<bool> },
    DeleteByIntegerKey { key: i64, reply: Reply<bool> },
    Read { key: String, reply: Reply<Vec<T>> },
    ReadAll { reply: Reply<Vec<T>> },
    Shutdown { reply: oneshot::Sender<()> },
}

impl<T> Command<T> {
    /// Answer a request the worker will no longer serve.
    fn abandon(self) {
        match self {
            Command::Insert { reply, .. }
            | Command::DeleteByStringKey { reply, .. }
            | Command::DeleteByIntegerKey { reply, .. } => {
                let _ = reply.send(Err(WorkerError::ThreadPanic));
            }
            Command::Read { reply, .. } | Command::ReadAll { reply } => {
                let _ = reply.send(Err(WorkerError::ThreadPanic));
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }
}

/// Owner of the worker thread.
pub struct StoreWorker<T> {
    handle: WorkerHandle<T>,
    thread: JoinHandle<Result<(), WorkerError>>,
}

impl<T: Send + 'static> StoreWorker<T> {
    /// Move `store` onto a new thread and start serving requests.
    ///
    /// # Arguments
    ///
    /// * `store` - The store the thread will own
    /// * `channel_size` - Pending requests allowed before senders wait
    pub fn spawn<S>(store: S, channel_size: usize) -> std::io::Result<Self>
    where
        S: RecordStore<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(channel_size.max(1));
        let table = store.table_name();

        let thread = thread::Builder::new()
            .name(format!("recstore-{table}"))
            .spawn(move || run(store, rx))?;

        tracing::debug!(table, channel_size, "Store worker started");

        Ok(Self {
            handle: WorkerHandle { tx },
            thread,
        })
    }

    /// A new handle for submitting requests.
    pub fn handle(&self) -> WorkerHandle<T> {
        self.handle.clone()
    }

    /// Wait for the worker thread to exit.
    ///
    /// The thread exits after a shutdown request or once every handle,
    /// including the one held here, has been dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::ThreadPanic`] if the store panicked while
    /// serving a request.
    pub fn join(self) -> Result<(), WorkerError> {
        drop(self.handle);
        self.thread.join().unwrap_or(Err(WorkerError::ThreadPanic))
    }
}

fn run<T, S>(store: S, mut rx: mpsc::Receiver<Command<T>>) -> Result<(), WorkerError>
where
    S: RecordStore<T>,
{
    let table = store.table_name();
    let served = serve(&store, &mut rx);

    if served.is_err() {
        tracing::error!(table, "Store panicked, failing queued requests");
        rx.close();
        while let Some(command) = rx.blocking_recv() {
            command.abandon();
        }
    }

    tracing::debug!(table, "Store worker stopped");
    served
}

fn serve<T, S>(store: &S, rx: &mut mpsc::Receiver<Command<T>>) -> Result<(), WorkerError>
where
    S: RecordStore<T>,
{
    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Insert { record, reply } => respond(reply, || store.insert(&record))?,
            Command::DeleteByStringKey { key, reply } => {
                respond(reply, || store.delete_by_string_key(&key))?
            }
            Command::DeleteByIntegerKey { key, reply } => {
                respond(reply, || store.delete_by_integer_key(key))?
            }
            Command::Read { key, reply } => respond(reply, || store.read(&key))?,
            Command::ReadAll { reply } => respond(reply, || store.read_all())?,
            Command::Shutdown { reply } => {
                let _ = reply.send(());
                break;
            }
        }
    }
    Ok(())
}

/// Run one store call and send its outcome to the caller.
///
/// A panic is reported to the caller as [`WorkerError::ThreadPanic`] and
/// returned so the worker stops serving. Send errors only mean the caller
/// stopped waiting.
fn respond<R, F>(reply: Reply<R>, call: F) -> Result<(), WorkerError>
where
    F: FnOnce() -> Result<R, StorageError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => {
            let _ = reply.send(result.map_err(WorkerError::from));
            Ok(())
        }
        Err(_) => {
            let _ = reply.send(Err(WorkerError::ThreadPanic));
            Err(WorkerError::ThreadPanic)
        }
    }
}

/// Cloneable async front end of a [`StoreWorker`].
pub struct WorkerHandle<T> {
    tx: mpsc::Sender<Command<T>>,
}

impl<T> Clone for WorkerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> WorkerHandle<T> {
    /// Insert one record.
    pub async fn insert(&self, record: T) -> Result<bool, WorkerError> {
        self.request(|reply| Command::Insert { record, reply }).await
    }

    /// Delete records whose key matches `key` (pattern match).
    pub async fn delete_by_string_key(&self, key: impl Into<String>) -> Result<bool, WorkerError> {
        let key = key.into();
        self.request(|reply| Command::DeleteByStringKey { key, reply })
            .await
    }

    /// Delete by integer key.
    pub async fn delete_by_integer_key(&self, key: i64) -> Result<bool, WorkerError> {
        self.request(|reply| Command::DeleteByIntegerKey { key, reply })
            .await
    }

    /// Records whose key equals `key`.
    pub async fn read(&self, key: impl Into<String>) -> Result<Vec<T>, WorkerError> {
        let key = key.into();
        self.request(|reply| Command::Read { key, reply }).await
    }

    /// Every stored record.
    pub async fn read_all(&self) -> Result<Vec<T>, WorkerError> {
        self.request(|reply| Command::ReadAll { reply }).await
    }

    /// Ask the worker to stop after the requests queued before this one.
    pub async fn shutdown(&self) -> Result<(), WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Shutdown { reply })
            .await
            .map_err(|_| WorkerError::ChannelClosed)?;
        rx.await.map_err(|_| WorkerError::ChannelClosed)
    }

    async fn request<R, F>(&self, build: F) -> Result<R, WorkerError>
    where
        F: FnOnce(Reply<R>) -> Command<T>,
    {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| WorkerError::ChannelClosed)?;
        rx.await.map_err(|_| WorkerError::ChannelClosed)?
    }
}
