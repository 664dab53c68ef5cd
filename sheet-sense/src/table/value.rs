//! Tagged cell values.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single cell of a loaded table.
///
/// Loaders resolve every cell into one of these variants up front, so the
/// classifier's structural checks are plain variant tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Absent cell.
    Missing,
    /// A value that was stored as a number.
    Number(f64),
    /// A value that was stored as a date or date/time.
    Timestamp(NaiveDateTime),
    /// Untyped textual content.
    Text(String),
}

impl CellValue {
    /// Builds a text cell, mapping `None` to [`CellValue::Missing`].
    pub fn text_or_missing<S: Into<String>>(value: Option<S>) -> Self {
        value.map_or(CellValue::Missing, |v| CellValue::Text(v.into()))
    }

    /// Builds a numeric cell, mapping `None` and NaN to [`CellValue::Missing`].
    pub fn number_or_missing(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => CellValue::Number(v),
            _ => CellValue::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Missing => "missing",
            CellValue::Number(_) => "number",
            CellValue::Timestamp(_) => "timestamp",
            CellValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number_or_missing(Some(value))
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Timestamp(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Missing, Into::into)
    }
}
