use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::SqliteRelayError;
use crate::statement::SqliteStatement;
use crate::types::Value;
use crate::worker::{Command, Worker};

/// Row counters reported by a one-shot [`SqliteConnection::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOutcome {
    /// Rows affected by the executed statement.
    pub changes: u64,
    /// Row identifier assigned by the most recent successful insert.
    pub last_insert_rowid: i64,
}

/// Owned handle to one engine connection, backed by a dedicated worker thread.
///
/// Exactly one handle owns the underlying connection; statements keep a
/// non-owning reference to it for the duration of their lives. Operations that
/// travel the engine's completion path (`open`, `close`, `prepare`, `step`,
/// `execute`) are async and delivered in issue order; the introspection
/// getters are synchronous reads of the snapshot refreshed at every
/// completion.
pub struct SqliteConnection {
    worker: Arc<Worker>,
}

impl SqliteConnection {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Projects the engine's status code when the database cannot be opened;
    /// a connection error if the worker thread cannot be spawned.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SqliteRelayError> {
        let worker = Worker::open(path.as_ref().to_path_buf()).await?;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    /// Release the engine connection. Consumes the handle; outstanding
    /// statement handles become inert.
    ///
    /// # Errors
    /// Projects the engine's status code when the close fails. The connection
    /// must be treated as unusable regardless of the outcome.
    pub async fn close(self) -> Result<(), SqliteRelayError> {
        self.worker
            .request(
                |respond_to| Command::Close { respond_to },
                "SQLite worker dropped while closing",
            )
            .await
    }

    /// Compile `sql` into a statement handle with its bind cursor at 1.
    ///
    /// On failure the engine's detailed message (distinct from the status
    /// description) is readable through [`err_msg`](Self::err_msg) until the
    /// next operation runs on this connection.
    ///
    /// # Errors
    /// Projects the engine's status code when compilation fails; no statement
    /// handle is produced in that case.
    pub async fn prepare(&self, sql: &str) -> Result<SqliteStatement, SqliteRelayError> {
        let sql_arc = Arc::new(sql.to_owned());
        let command_sql = Arc::clone(&sql_arc);
        let info = self
            .worker
            .request(
                |respond_to| Command::Prepare {
                    sql: command_sql,
                    respond_to,
                },
                "SQLite worker dropped while preparing statement",
            )
            .await?;
        Ok(SqliteStatement::new(
            Arc::downgrade(&self.worker),
            info,
            sql_arc,
        ))
    }

    /// One-shot prepare, positional bind, and single step.
    ///
    /// The statement handle is managed internally and finalized on both the
    /// success and the failure path, so nothing leaks when the step fails.
    ///
    /// # Errors
    /// Short-circuits with the first failure from prepare, bind, or step.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<ExecuteOutcome, SqliteRelayError> {
        let mut stmt = self.prepare(sql).await?;
        let stepped = match stmt.bind_all(params) {
            Ok(()) => stmt.step().await,
            Err(err) => Err(err),
        };
        let finalized = stmt.finalize();
        let _ = stepped?;
        finalized?;
        Ok(ExecuteOutcome {
            changes: self.changes(),
            last_insert_rowid: self.last_insert_rowid(),
        })
    }

    /// The engine's most recent error text for this connection. May be stale
    /// or empty if no error has occurred.
    #[must_use]
    pub fn err_msg(&self) -> String {
        self.worker.snapshot().err_msg
    }

    /// True while the connection is outside an explicit transaction.
    #[must_use]
    pub fn autocommit(&self) -> bool {
        self.worker.snapshot().autocommit
    }

    /// Rows affected by the most recently completed data-modifying statement
    /// on this connection.
    #[must_use]
    pub fn changes(&self) -> u64 {
        self.worker.snapshot().changes
    }

    /// Row identifier assigned by the most recent successful insert on this
    /// connection.
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        self.worker.snapshot().last_insert_rowid
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.worker.path())
            .finish()
    }
}

/// Version string of the underlying engine library.
#[must_use]
pub fn version() -> &'static str {
    rusqlite::version()
}
