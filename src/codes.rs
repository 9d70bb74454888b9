//! Engine status-code table.
//!
//! Every engine call answers with a small integer status. This module maps
//! those codes to stable symbolic identifiers and, for the handful of codes
//! callers routinely see, a fixed human description. The mapping is total:
//! codes outside the table resolve to the `UNKNOWN` sentinel.

/// Successful result.
pub const SQLITE_OK: i32 = 0;
/// Generic SQL error or missing database.
pub const SQLITE_ERROR: i32 = 1;
/// Bind parameter index out of range.
pub const SQLITE_RANGE: i32 = 25;
/// File opened that is not a database file.
pub const SQLITE_NOTADB: i32 = 26;
/// Stepping produced a result row.
pub const SQLITE_ROW: i32 = 100;
/// Stepping finished executing the statement.
pub const SQLITE_DONE: i32 = 101;

/// Primary status codes, in engine order. Reverse lookup takes the first
/// match, so duplicates (the engine has none) would resolve to the earliest
/// entry.
const IDENTIFIERS: &[(i32, &str)] = &[
    (SQLITE_OK, "SQLITE_OK"),
    (SQLITE_ERROR, "SQLITE_ERROR"),
    (2, "SQLITE_INTERNAL"),
    (3, "SQLITE_PERM"),
    (4, "SQLITE_ABORT"),
    (5, "SQLITE_BUSY"),
    (6, "SQLITE_LOCKED"),
    (7, "SQLITE_NOMEM"),
    (8, "SQLITE_READONLY"),
    (9, "SQLITE_INTERRUPT"),
    (10, "SQLITE_IOERR"),
    (11, "SQLITE_CORRUPT"),
    (12, "SQLITE_NOTFOUND"),
    (13, "SQLITE_FULL"),
    (14, "SQLITE_CANTOPEN"),
    (15, "SQLITE_PROTOCOL"),
    (16, "SQLITE_EMPTY"),
    (17, "SQLITE_SCHEMA"),
    (18, "SQLITE_TOOBIG"),
    (19, "SQLITE_CONSTRAINT"),
    (20, "SQLITE_MISMATCH"),
    (21, "SQLITE_MISUSE"),
    (22, "SQLITE_NOLFS"),
    (23, "SQLITE_AUTH"),
    (24, "SQLITE_FORMAT"),
    (SQLITE_RANGE, "SQLITE_RANGE"),
    (SQLITE_NOTADB, "SQLITE_NOTADB"),
    (SQLITE_ROW, "SQLITE_ROW"),
    (SQLITE_DONE, "SQLITE_DONE"),
];

/// Symbolic identifier for a status code, or `UNKNOWN` for codes outside the
/// table.
#[must_use]
pub fn status_identifier(code: i32) -> &'static str {
    IDENTIFIERS
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map_or("UNKNOWN", |(_, identifier)| *identifier)
}

/// Fixed description for the well-known status codes.
#[must_use]
pub fn status_description(code: i32) -> Option<&'static str> {
    match code {
        SQLITE_OK => Some("Successful result"),
        SQLITE_ERROR => Some("SQL error or missing database"),
        SQLITE_RANGE => Some("2nd parameter to sqlite3_bind out of range"),
        SQLITE_NOTADB => Some("File opened that is not a database file"),
        SQLITE_ROW => Some("sqlite3_step() has another row ready"),
        SQLITE_DONE => Some("sqlite3_step() has finished executing"),
        _ => None,
    }
}

/// Render a status code as `IDENTIFIER (code)` with the description appended
/// when one is registered.
#[must_use]
pub fn describe_status(code: i32) -> String {
    match status_description(code) {
        Some(description) => format!("{} ({code}): {description}", status_identifier(code)),
        None => format!("{} ({code})", status_identifier(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_lookup() {
        assert_eq!(status_identifier(SQLITE_OK), "SQLITE_OK");
        assert_eq!(status_identifier(5), "SQLITE_BUSY");
        assert_eq!(status_identifier(SQLITE_DONE), "SQLITE_DONE");
    }

    #[test]
    fn unknown_codes_resolve_to_sentinel() {
        assert_eq!(status_identifier(-1), "UNKNOWN");
        assert_eq!(status_identifier(9000), "UNKNOWN");
    }

    #[test]
    fn describes_well_known_codes() {
        assert_eq!(
            describe_status(SQLITE_RANGE),
            "SQLITE_RANGE (25): 2nd parameter to sqlite3_bind out of range"
        );
        assert_eq!(
            describe_status(SQLITE_ROW),
            "SQLITE_ROW (100): sqlite3_step() has another row ready"
        );
    }

    #[test]
    fn falls_back_to_identifier_and_code() {
        assert_eq!(describe_status(5), "SQLITE_BUSY (5)");
        assert_eq!(describe_status(9000), "UNKNOWN (9000)");
    }
}
