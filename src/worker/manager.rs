use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread;

use tokio::sync::oneshot;

use crate::error::SqliteRelayError;

use super::channel::{Command, Completion, EngineState};
use super::dispatcher::run_worker;

static WORKER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Caller-side handle to the worker thread owning one engine connection.
pub(crate) struct Worker {
    sender: Sender<Command>,
    state: Mutex<EngineState>,
    path: PathBuf,
}

impl Worker {
    /// Spawn the worker thread and wait for it to open the database at `path`.
    pub(crate) async fn open(path: PathBuf) -> Result<Self, SqliteRelayError> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = oneshot::channel();
        let seq = WORKER_SEQ.fetch_add(1, Ordering::Relaxed);
        let worker_path = path.clone();
        thread::Builder::new()
            .name(format!("sqlite-relay-{seq}"))
            .spawn(move || run_worker(&worker_path, ready_tx, &receiver))
            .map_err(|err| {
                SqliteRelayError::ConnectionError(format!(
                    "failed to spawn SQLite worker thread: {err}"
                ))
            })?;

        let state = ready_rx
            .await
            .map_err(|_| connection_error("SQLite worker exited before opening the database"))??;
        Ok(Self {
            sender,
            state: Mutex::new(state),
            path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn send_command(&self, command: Command) -> Result<(), SqliteRelayError> {
        self.sender
            .send(command)
            .map_err(|_| connection_error("SQLite worker closed"))
    }

    /// Dispatch a command and await its completion, refreshing the shared
    /// introspection snapshot before handing the result back.
    pub(crate) async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Completion<T>>) -> Command,
        drop_message: &'static str,
    ) -> Result<T, SqliteRelayError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        let completion = rx.await.map_err(|_| connection_error(drop_message))?;
        self.store_state(completion.state);
        completion.result
    }

    pub(crate) fn snapshot(&self) -> EngineState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_state(&self, state: EngineState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}

fn connection_error(message: &str) -> SqliteRelayError {
    SqliteRelayError::ConnectionError(message.into())
}
