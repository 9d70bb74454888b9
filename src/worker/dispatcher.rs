use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::Receiver;

use rusqlite::Connection;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::SqliteRelayError;

use super::channel::{Command, Completion, EngineState, PreparedInfo, RowData};

/// Worker-thread entry point: open the database, signal readiness, then serve
/// commands until Close/Shutdown or until every caller handle is gone.
pub(super) fn run_worker(
    path: &Path,
    ready: oneshot::Sender<Result<EngineState, SqliteRelayError>>,
    receiver: &Receiver<Command>,
) {
    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            let _ = ready.send(Err(SqliteRelayError::from(err)));
            return;
        }
    };
    debug!(path = %path.display(), "sqlite worker connected");
    if ready.send(Ok(capture_state(&conn, String::new()))).is_err() {
        // Caller gave up before the open completed; nothing to serve.
        return;
    }

    if let Some(respond_to) = serve(&conn, receiver) {
        let state = capture_state(&conn, String::new());
        let result = conn.close().map_err(|(_, err)| SqliteRelayError::from(err));
        let _ = respond_to.send(Completion { result, state });
    }
    debug!(path = %path.display(), "sqlite worker stopped");
}

/// Command loop. Owns the live statement table; its entries borrow the
/// connection, so the loop hands control back (dropping the table) before
/// `run_worker` consumes the connection to close it.
fn serve(conn: &Connection, receiver: &Receiver<Command>) -> Option<oneshot::Sender<Completion<()>>> {
    let mut statements: HashMap<u64, rusqlite::Statement<'_>> = HashMap::new();
    let mut next_statement_id: u64 = 1;
    let mut last_error = String::new();

    while let Ok(command) = receiver.recv() {
        match command {
            Command::Prepare { sql, respond_to } => {
                let result = record_failure(
                    &mut last_error,
                    prepare(conn, &mut statements, &mut next_statement_id, &sql),
                );
                let _ = respond_to.send(Completion {
                    result,
                    state: capture_state(conn, last_error.clone()),
                });
            }
            Command::Execute {
                statement_id,
                params,
                respond_to,
            } => {
                let result =
                    record_failure(&mut last_error, execute(&mut statements, statement_id, params));
                let _ = respond_to.send(Completion {
                    result,
                    state: capture_state(conn, last_error.clone()),
                });
            }
            Command::Finalize { statement_id } => {
                if statements.remove(&statement_id).is_none() {
                    warn!(statement_id, "finalize for unknown statement handle");
                }
            }
            Command::Close { respond_to } => {
                statements.clear();
                return Some(respond_to);
            }
            Command::Shutdown => break,
        }
    }
    None
}

fn prepare<'conn>(
    conn: &'conn Connection,
    statements: &mut HashMap<u64, rusqlite::Statement<'conn>>,
    next_statement_id: &mut u64,
    sql: &str,
) -> Result<PreparedInfo, SqliteRelayError> {
    let stmt = conn.prepare(sql)?;
    let info = PreparedInfo {
        statement_id: *next_statement_id,
        parameter_count: stmt.parameter_count(),
        column_count: stmt.column_count(),
    };
    *next_statement_id += 1;
    statements.insert(info.statement_id, stmt);
    debug!(statement_id = info.statement_id, "statement prepared");
    Ok(info)
}

/// Bind the shipped parameter values and run the statement to completion,
/// materializing every produced row. The caller-side handle serves the rows
/// step by step.
fn execute(
    statements: &mut HashMap<u64, rusqlite::Statement<'_>>,
    statement_id: u64,
    params: Vec<rusqlite::types::Value>,
) -> Result<Vec<RowData>, SqliteRelayError> {
    let stmt = statements.get_mut(&statement_id).ok_or_else(|| {
        SqliteRelayError::Usage(format!("unknown statement handle {statement_id}"))
    })?;
    let column_count = stmt.column_count();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for index in 0..column_count {
            cells.push(row.get::<_, rusqlite::types::Value>(index)?);
        }
        collected.push(cells);
    }
    Ok(collected)
}

/// Remember the engine's error text so `err_msg` can report it after the
/// completion is delivered.
fn record_failure<T>(
    last_error: &mut String,
    result: Result<T, SqliteRelayError>,
) -> Result<T, SqliteRelayError> {
    if let Err(SqliteRelayError::Engine(engine)) = &result {
        *last_error = match &engine.detail {
            Some(detail) => detail.clone(),
            None => engine.description(),
        };
    }
    result
}

fn capture_state(conn: &Connection, err_msg: String) -> EngineState {
    EngineState {
        autocommit: conn.is_autocommit(),
        changes: conn.changes(),
        last_insert_rowid: conn.last_insert_rowid(),
        err_msg,
    }
}
