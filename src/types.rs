use rusqlite::types::Value as SqlValue;

/// Dynamically typed value crossing the bind/column boundary.
///
/// The variant set is fixed to what the statement protocol supports: 64-bit
/// integers, 64-bit floats, text, and NULL. Blob columns exist in the engine
/// but deliberately have no variant here; the tag-dispatching column reader
/// rejects them.
///
/// ```
/// use sqlite_relay::Value;
///
/// let params = vec![
///     Value::Integer(1),
///     Value::Text("alice".into()),
///     Value::Null,
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer value (64-bit).
    Integer(i64),
    /// Floating point value (64-bit).
    Float(f64),
    /// Text value.
    Text(String),
    /// NULL value.
    Null,
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub(crate) fn to_engine(&self) -> SqlValue {
        match self {
            Value::Integer(v) => SqlValue::Integer(*v),
            Value::Float(v) => SqlValue::Real(*v),
            Value::Text(v) => SqlValue::Text(v.clone()),
            Value::Null => SqlValue::Null,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Dynamic datatype tag the engine reports for a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

impl ColumnType {
    /// Engine datatype code for this tag.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            ColumnType::Integer => 1,
            ColumnType::Float => 2,
            ColumnType::Text => 3,
            ColumnType::Blob => 4,
            ColumnType::Null => 5,
        }
    }

    /// Reverse lookup from an engine datatype code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ColumnType::Integer),
            2 => Some(ColumnType::Float),
            3 => Some(ColumnType::Text),
            4 => Some(ColumnType::Blob),
            5 => Some(ColumnType::Null),
            _ => None,
        }
    }

    pub(crate) fn of_cell(cell: &SqlValue) -> Self {
        match cell {
            SqlValue::Integer(_) => ColumnType::Integer,
            SqlValue::Real(_) => ColumnType::Float,
            SqlValue::Text(_) => ColumnType::Text,
            SqlValue::Blob(_) => ColumnType::Blob,
            SqlValue::Null => ColumnType::Null,
        }
    }
}

// Typed column readers follow the engine's column-access coercions: NULL reads
// as zero or empty text, numbers cross-cast, and text converts through its
// leading numeric prefix.

pub(crate) fn cell_to_integer(cell: &SqlValue) -> i64 {
    match cell {
        SqlValue::Integer(v) => *v,
        SqlValue::Real(v) => *v as i64,
        SqlValue::Text(text) => text_to_integer(text),
        SqlValue::Blob(bytes) => text_to_integer(&String::from_utf8_lossy(bytes)),
        SqlValue::Null => 0,
    }
}

pub(crate) fn cell_to_float(cell: &SqlValue) -> f64 {
    match cell {
        SqlValue::Integer(v) => *v as f64,
        SqlValue::Real(v) => *v,
        SqlValue::Text(text) => numeric_prefix(text).parse::<f64>().unwrap_or(0.0),
        SqlValue::Blob(bytes) => numeric_prefix(&String::from_utf8_lossy(bytes))
            .parse::<f64>()
            .unwrap_or(0.0),
        SqlValue::Null => 0.0,
    }
}

pub(crate) fn cell_to_text(cell: &SqlValue) -> String {
    match cell {
        SqlValue::Integer(v) => v.to_string(),
        SqlValue::Real(v) => v.to_string(),
        SqlValue::Text(text) => text.clone(),
        SqlValue::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        SqlValue::Null => String::new(),
    }
}

fn text_to_integer(text: &str) -> i64 {
    let prefix = numeric_prefix(text);
    prefix
        .parse::<i64>()
        .unwrap_or_else(|_| prefix.parse::<f64>().map_or(0, |v| v as i64))
}

/// Longest leading substring that parses as a number: optional sign, digits,
/// optional fraction and exponent. Leading whitespace is skipped.
fn numeric_prefix(text: &str) -> &str {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end > digits_start && end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exponent = end + 1;
        if exponent < bytes.len() && (bytes[exponent] == b'+' || bytes[exponent] == b'-') {
            exponent += 1;
        }
        if exponent < bytes.len() && bytes[exponent].is_ascii_digit() {
            end = exponent;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
    }
    &trimmed[..end]
}
