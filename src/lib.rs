//! Asynchronous client layer over an embedded SQLite engine.
//!
//! Each open connection is backed by a dedicated worker thread that owns the
//! engine handle and every statement prepared on it. Callers drive the
//! statement protocol — bind, step, column reads, reset, finalize — through
//! cheap handles. Operations that travel the engine's completion path
//! (`open`, `close`, `prepare`, `step`) are async and are delivered in issue
//! order over the per-connection command channel; everything else completes
//! without suspension.
//!
//! ```no_run
//! use sqlite_relay::{SqliteConnection, StepOutcome};
//!
//! # async fn demo() -> Result<(), sqlite_relay::SqliteRelayError> {
//! let conn = SqliteConnection::open("app.db").await?;
//! let mut stmt = conn.prepare("select ?").await?;
//! stmt.bind("let it be")?;
//! if stmt.step().await? == StepOutcome::Row {
//!     let greeting = stmt.column_text(0)?;
//!     # let _ = greeting;
//! }
//! stmt.finalize()?;
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod codes;
mod connection;
mod error;
pub mod prelude;
mod statement;
mod types;
mod worker;

pub use connection::{ExecuteOutcome, SqliteConnection, version};
pub use error::{EngineError, SqliteRelayError};
pub use statement::{SqliteStatement, StepOutcome};
pub use types::{ColumnType, Value};
