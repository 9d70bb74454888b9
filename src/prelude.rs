//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::codes;
pub use crate::{
    ColumnType, EngineError, ExecuteOutcome, SqliteConnection, SqliteRelayError, SqliteStatement,
    StepOutcome, Value, version,
};
