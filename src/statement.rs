use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use rusqlite::types::Value as SqlValue;

use crate::codes;
use crate::error::{EngineError, SqliteRelayError};
use crate::types::{ColumnType, Value, cell_to_float, cell_to_integer, cell_to_text};
use crate::worker::{Command, PreparedInfo, RowData, Worker};

/// Non-error outcome of advancing statement execution by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A result row is available for column reads.
    Row,
    /// Execution finished; no more rows will be produced.
    Done,
}

enum ExecState {
    /// Not executed yet (fresh, or rewound by `reset`). Binding is permitted.
    Pending,
    /// Mid-execution: `current` is the row readable through the column
    /// surface, `pending` holds the rows later steps will serve.
    Rows {
        pending: VecDeque<RowData>,
        current: Option<RowData>,
    },
    /// Execution finished; only reset, clear_bindings, and finalize apply.
    Done,
    Finalized,
}

/// Handle to one prepared statement owned by a connection's worker thread.
///
/// The handle keeps the bind-parameter cursor, the buffered parameter values,
/// and the rows of the current execution, so every operation other than
/// [`step`](Self::step) completes without suspension. It holds a non-owning
/// reference to the worker: dropping or closing the connection is never caused
/// by a statement.
pub struct SqliteStatement {
    worker: Weak<Worker>,
    statement_id: u64,
    sql: Arc<String>,
    parameter_count: usize,
    column_count: usize,
    bindings: Vec<Value>,
    bind_cursor: usize,
    state: ExecState,
}

impl SqliteStatement {
    pub(crate) fn new(worker: Weak<Worker>, info: PreparedInfo, sql: Arc<String>) -> Self {
        Self {
            worker,
            statement_id: info.statement_id,
            sql,
            parameter_count: info.parameter_count,
            column_count: info.column_count,
            bindings: vec![Value::Null; info.parameter_count],
            bind_cursor: 1,
            state: ExecState::Pending,
        }
    }

    /// Bind `value` at the current bind-parameter cursor position, then
    /// advance the cursor.
    ///
    /// # Errors
    /// Projects the engine's range error when the cursor has moved past the
    /// statement's last parameter; usage error when the statement is executing
    /// or finalized.
    pub fn bind(&mut self, value: impl Into<Value>) -> Result<(), SqliteRelayError> {
        let index = self.bind_cursor;
        self.bind_cursor += 1;
        self.bind_checked(value.into(), index)
    }

    /// Bind `value` at the 1-based parameter position `index`, leaving the
    /// cursor alone.
    ///
    /// # Errors
    /// Usage error for index 0 (raised before any engine interaction); the
    /// engine's range error for an index past the last parameter.
    pub fn bind_at(&mut self, value: impl Into<Value>, index: usize) -> Result<(), SqliteRelayError> {
        if index == 0 {
            return Err(SqliteRelayError::Usage(
                "Index must be a positive integer.".into(),
            ));
        }
        self.bind_checked(value.into(), index)
    }

    /// Bind every element of `values` to positions 1..=N in order, ignoring
    /// the cursor. A no-op for an empty slice.
    ///
    /// # Errors
    /// Same conditions as [`bind_at`](Self::bind_at) for each element.
    pub fn bind_all(&mut self, values: &[Value]) -> Result<(), SqliteRelayError> {
        for (offset, value) in values.iter().enumerate() {
            self.bind_checked(value.clone(), offset + 1)?;
        }
        Ok(())
    }

    fn bind_checked(&mut self, value: Value, index: usize) -> Result<(), SqliteRelayError> {
        match self.state {
            ExecState::Pending => {}
            ExecState::Finalized => return Err(finalized_error()),
            _ => {
                return Err(SqliteRelayError::Usage(
                    "statement is executing; reset it before rebinding".into(),
                ));
            }
        }
        if index > self.parameter_count {
            return Err(EngineError::new(codes::SQLITE_RANGE, None).into());
        }
        self.bindings[index - 1] = value;
        Ok(())
    }

    /// Advance execution by one step.
    ///
    /// The first step after prepare or [`reset`](Self::reset) ships the bound
    /// parameter values to the worker and runs the statement; the rows it
    /// produced are then served by subsequent steps. Unbound parameters
    /// execute as NULL.
    ///
    /// # Errors
    /// Engine errors from execution; usage errors when stepping a finished or
    /// finalized statement.
    pub async fn step(&mut self) -> Result<StepOutcome, SqliteRelayError> {
        match self.state {
            ExecState::Finalized => return Err(finalized_error()),
            ExecState::Done => {
                return Err(SqliteRelayError::Usage(
                    "statement execution already finished; reset it before stepping again".into(),
                ));
            }
            ExecState::Pending => {
                let worker = self.worker()?;
                let statement_id = self.statement_id;
                let params: Vec<SqlValue> = self.bindings.iter().map(Value::to_engine).collect();
                let rows = worker
                    .request(
                        |respond_to| Command::Execute {
                            statement_id,
                            params,
                            respond_to,
                        },
                        "SQLite worker dropped while stepping statement",
                    )
                    .await?;
                self.state = ExecState::Rows {
                    pending: rows.into(),
                    current: None,
                };
            }
            ExecState::Rows { .. } => {}
        }

        if let ExecState::Rows { pending, current } = &mut self.state {
            if let Some(row) = pending.pop_front() {
                *current = Some(row);
                return Ok(StepOutcome::Row);
            }
        }
        self.state = ExecState::Done;
        Ok(StepOutcome::Done)
    }

    /// Number of columns in this statement's result shape, as reported at
    /// prepare time.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Dynamic type tag of column `index` (0-based) in the current row.
    ///
    /// # Errors
    /// Usage error when no row is available or `index` is out of range.
    pub fn column_type(&self, index: usize) -> Result<ColumnType, SqliteRelayError> {
        Ok(ColumnType::of_cell(self.cell(index)?))
    }

    /// Read column `index` as a 64-bit integer, applying the engine's
    /// column-access coercions.
    ///
    /// # Errors
    /// Usage error when no row is available or `index` is out of range.
    pub fn column_integer(&self, index: usize) -> Result<i64, SqliteRelayError> {
        Ok(cell_to_integer(self.cell(index)?))
    }

    /// Read column `index` as a 64-bit float, applying the engine's
    /// column-access coercions.
    ///
    /// # Errors
    /// Usage error when no row is available or `index` is out of range.
    pub fn column_float(&self, index: usize) -> Result<f64, SqliteRelayError> {
        Ok(cell_to_float(self.cell(index)?))
    }

    /// Read column `index` as text, applying the engine's column-access
    /// coercions.
    ///
    /// # Errors
    /// Usage error when no row is available or `index` is out of range.
    pub fn column_text(&self, index: usize) -> Result<String, SqliteRelayError> {
        Ok(cell_to_text(self.cell(index)?))
    }

    /// Read column `index` as a [`Value`], dispatching on the column's type
    /// tag.
    ///
    /// # Errors
    /// Usage error for a tag outside the supported set (blob columns), when no
    /// row is available, or when `index` is out of range.
    pub fn column(&self, index: usize) -> Result<Value, SqliteRelayError> {
        match self.cell(index)? {
            SqlValue::Integer(v) => Ok(Value::Integer(*v)),
            SqlValue::Real(v) => Ok(Value::Float(*v)),
            SqlValue::Text(v) => Ok(Value::Text(v.clone())),
            SqlValue::Null => Ok(Value::Null),
            SqlValue::Blob(_) => Err(SqliteRelayError::Usage(format!(
                "unsupported column type at index {index}: blob"
            ))),
        }
    }

    fn cell(&self, index: usize) -> Result<&SqlValue, SqliteRelayError> {
        let ExecState::Rows {
            current: Some(row), ..
        } = &self.state
        else {
            return Err(SqliteRelayError::Usage(
                "no row is available; step the statement first".into(),
            ));
        };
        row.get(index).ok_or_else(|| {
            SqliteRelayError::Usage(format!("column index {index} out of range"))
        })
    }

    /// Clear every bound parameter value and return the bind cursor to 1.
    /// Unlike [`reset`](Self::reset), execution state is left untouched.
    ///
    /// # Errors
    /// Usage error after finalize.
    pub fn clear_bindings(&mut self) -> Result<(), SqliteRelayError> {
        if matches!(self.state, ExecState::Finalized) {
            return Err(finalized_error());
        }
        self.bindings.fill(Value::Null);
        self.bind_cursor = 1;
        Ok(())
    }

    /// Rewind the statement so it can be stepped again. Bound parameter values
    /// are retained; the bind cursor returns to 1.
    ///
    /// # Errors
    /// Usage error after finalize.
    pub fn reset(&mut self) -> Result<(), SqliteRelayError> {
        if matches!(self.state, ExecState::Finalized) {
            return Err(finalized_error());
        }
        self.state = ExecState::Pending;
        self.bind_cursor = 1;
        Ok(())
    }

    /// Source text this statement was compiled from.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.sql.as_str()
    }

    /// Release the statement's worker-side resources. Must be called exactly
    /// once; the release is ordered ahead of any later operation on the same
    /// connection.
    ///
    /// # Errors
    /// Usage error when the statement was already finalized.
    pub fn finalize(&mut self) -> Result<(), SqliteRelayError> {
        if matches!(self.state, ExecState::Finalized) {
            return Err(SqliteRelayError::Usage("statement already finalized".into()));
        }
        self.state = ExecState::Finalized;
        self.release();
        Ok(())
    }

    fn release(&self) {
        // With the connection gone the statement is gone too, so a failed
        // send needs no reporting.
        if let Some(worker) = self.worker.upgrade() {
            let _ = worker.send_command(Command::Finalize {
                statement_id: self.statement_id,
            });
        }
    }

    fn worker(&self) -> Result<Arc<Worker>, SqliteRelayError> {
        self.worker.upgrade().ok_or_else(|| {
            SqliteRelayError::ConnectionError("connection handle was dropped".into())
        })
    }
}

impl Drop for SqliteStatement {
    fn drop(&mut self) {
        if !matches!(self.state, ExecState::Finalized) {
            self.release();
        }
    }
}

impl fmt::Debug for SqliteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("statement_id", &self.statement_id)
            .field("sql", &self.sql)
            .finish()
    }
}

fn finalized_error() -> SqliteRelayError {
    SqliteRelayError::Usage("statement used after finalize".into())
}
