//! Per-cell coercion attempts used by the classifier.
//!
//! Every function here answers "does this cell read as X?" and never errors;
//! a failed attempt simply lowers the column's success fraction.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::CellValue;

/// Decimal literal with optional sign, fraction and exponent.
static NUMBER_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid number pattern")
});

/// Cheap pre-filter: anything that can be a date or time contains a digit.
static HAS_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit pattern"));

/// Date used for time-of-day values that carry no calendar date (1970-01-01).
pub(crate) fn time_only_base_date() -> NaiveDate {
    NaiveDate::default()
}

/// Compiled date/time parsing rules.
#[derive(Debug, Clone)]
pub(crate) struct DateParser {
    date_formats: Vec<String>,
    datetime_formats: Vec<String>,
    time_formats: Vec<String>,
}

impl DateParser {
    pub(crate) fn new(
        date_formats: &[String],
        datetime_formats: &[String],
        time_formats: &[String],
    ) -> Self {
        Self {
            date_formats: date_formats.to_vec(),
            datetime_formats: datetime_formats.to_vec(),
            time_formats: time_formats.to_vec(),
        }
    }

    /// Interprets a cell as a date/time.
    ///
    /// Native timestamps pass through, numbers never match, text is tried
    /// against RFC 3339 and then the configured formats in order.
    pub(crate) fn coerce(&self, value: &CellValue) -> Option<NaiveDateTime> {
        match value {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Text(text) => self.parse_text(text),
            CellValue::Number(_) | CellValue::Missing => None,
        }
    }

    pub(crate) fn parse_text(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() || !HAS_DIGIT.is_match(text) {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_utc());
        }

        for format in &self.datetime_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(dt);
            }
        }

        for format in &self.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date.and_time(NaiveTime::MIN));
            }
        }

        for format in &self.time_formats {
            if let Ok(time) = NaiveTime::parse_from_str(text, format) {
                return Some(time_only_base_date().and_time(time));
            }
        }

        None
    }
}

/// Interprets a cell as a number.
///
/// Native numbers pass through, timestamps never match, text must be a plain
/// decimal literal (surrounding whitespace is ignored).
pub(crate) fn coerce_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(text) => parse_number(text),
        CellValue::Timestamp(_) | CellValue::Missing => None,
    }
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if !NUMBER_LITERAL.is_match(text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
