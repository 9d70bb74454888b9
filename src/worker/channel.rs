use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::SqliteRelayError;

/// Values of one materialized result row, in column order.
pub(crate) type RowData = Vec<rusqlite::types::Value>;

/// Connection introspection captured on the worker after each command.
///
/// The caller-side handle keeps the latest snapshot so the synchronous getters
/// (`autocommit`, `changes`, `last_insert_rowid`, `err_msg`) never have to
/// cross the channel. Between completions no engine activity happens on the
/// connection, so the snapshot is exact under the required caller-side
/// serialization.
#[derive(Debug, Clone)]
pub(crate) struct EngineState {
    pub autocommit: bool,
    pub changes: u64,
    pub last_insert_rowid: i64,
    pub err_msg: String,
}

/// Outcome of one worker command plus the post-command snapshot.
pub(crate) struct Completion<T> {
    pub result: Result<T, SqliteRelayError>,
    pub state: EngineState,
}

/// Shape of a statement right after compilation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PreparedInfo {
    pub statement_id: u64,
    pub parameter_count: usize,
    pub column_count: usize,
}

pub(crate) enum Command {
    Prepare {
        sql: Arc<String>,
        respond_to: oneshot::Sender<Completion<PreparedInfo>>,
    },
    Execute {
        statement_id: u64,
        params: Vec<rusqlite::types::Value>,
        respond_to: oneshot::Sender<Completion<Vec<RowData>>>,
    },
    Finalize {
        statement_id: u64,
    },
    Close {
        respond_to: oneshot::Sender<Completion<()>>,
    },
    Shutdown,
}
