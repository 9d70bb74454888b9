use std::fmt;

use thiserror::Error;

use crate::codes;

/// Structured projection of a non-success engine status code.
///
/// Carries the raw numeric code; the symbolic identifier and description are
/// derived through the status-code table, so the projection stays total for
/// codes the table does not know. `detail` holds the engine's per-connection
/// error text when one was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub code: i32,
    pub detail: Option<String>,
}

impl EngineError {
    #[must_use]
    pub fn new(code: i32, detail: Option<String>) -> Self {
        Self { code, detail }
    }

    /// Symbolic identifier resolved through the status-code table.
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        codes::status_identifier(self.code)
    }

    /// `IDENTIFIER (code)[: description]` rendering of the status code.
    #[must_use]
    pub fn description(&self) -> String {
        codes::describe_status(self.code)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(cause, message) => EngineError {
                // Extended codes refine a primary code in the low byte.
                code: cause.extended_code & 0xff,
                detail: message,
            },
            other => EngineError {
                code: codes::SQLITE_ERROR,
                detail: Some(other.to_string()),
            },
        }
    }
}

/// Errors surfaced by connection and statement operations.
#[derive(Debug, Error)]
pub enum SqliteRelayError {
    /// The engine answered a non-success status code.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The caller violated a precondition; detected before touching the engine.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The worker thread or its command channel is gone.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl SqliteRelayError {
    /// Raw engine status code, when this is an engine error.
    #[must_use]
    pub fn engine_code(&self) -> Option<i32> {
        if let SqliteRelayError::Engine(engine) = self {
            Some(engine.code)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for SqliteRelayError {
    fn from(err: rusqlite::Error) -> Self {
        SqliteRelayError::Engine(err.into())
    }
}
