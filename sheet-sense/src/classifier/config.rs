//! Classifier configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};

/// Tunable thresholds and vocabularies for the role classifier.
///
/// All keyword and vocabulary matching is case-insensitive. The defaults are
/// the canonical rule set; deserialized configs fill absent fields from them.
///
/// ```rust
/// use sheet_sense::classifier::ClassifierConfig;
///
/// let config = ClassifierConfig::from_json_str(r#"{ "numeric_threshold": 0.9 }"#).unwrap();
/// assert_eq!(config.numeric_threshold, 0.9);
/// assert_eq!(config.date_threshold, 0.6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum fraction of parseable dates for a keyword-named column (default: 0.6)
    pub date_threshold: f64,
    /// Minimum fraction of values coercible to numbers (default: 0.8)
    pub numeric_threshold: f64,
    /// Name substrings that enable date parsing
    pub date_name_keywords: Vec<String>,
    /// Cell values that mark a status column
    pub status_values: Vec<String>,
    /// Name substrings that mark an identifier column
    pub identifier_name_keywords: Vec<String>,
    /// chrono formats tried for date-only text, in order
    pub date_formats: Vec<String>,
    /// chrono formats tried for date-and-time text, in order
    pub datetime_formats: Vec<String>,
    /// chrono formats tried for time-of-day text, in order
    pub time_formats: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            date_threshold: 0.6,
            numeric_threshold: 0.8,
            date_name_keywords: strings(&["date", "time", "start", "end"]),
            status_values: strings(&[
                "yes", "no", "closed", "open", "passed", "failed", "done", "pending",
            ]),
            identifier_name_keywords: strings(&[
                "id",
                "name",
                "ref",
                "user",
                "agent",
                "technician",
                "caller",
            ]),
            date_formats: strings(&[
                "%Y-%m-%d",
                "%Y/%m/%d",
                "%m/%d/%Y",
                "%d.%m.%Y",
                "%d-%b-%Y",
                "%d %b %Y",
                "%b %d, %Y",
                "%B %d, %Y",
            ]),
            datetime_formats: strings(&[
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%dT%H:%M:%S",
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M",
                "%Y-%m-%dT%H:%M",
                "%Y/%m/%d %H:%M:%S",
                "%m/%d/%Y %H:%M:%S",
                "%m/%d/%Y %H:%M",
                "%m/%d/%Y %I:%M %p",
                "%d.%m.%Y %H:%M:%S",
                "%d.%m.%Y %H:%M",
            ]),
            time_formats: strings(&["%H:%M:%S", "%H:%M", "%I:%M %p"]),
        }
    }
}

impl ClassifierConfig {
    /// Parses a configuration from JSON; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks thresholds and vocabularies.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Configuration`] when a threshold lies outside
    /// `[0, 1]` or a keyword list or format list is empty.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("date_threshold", self.date_threshold),
            ("numeric_threshold", self.numeric_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SheetError::configuration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        for (name, list) in [
            ("date_name_keywords", &self.date_name_keywords),
            ("status_values", &self.status_values),
            ("identifier_name_keywords", &self.identifier_name_keywords),
        ] {
            if list.iter().all(|k| k.trim().is_empty()) {
                return Err(SheetError::configuration(format!(
                    "{name} must contain at least one non-empty entry"
                )));
            }
        }

        if self.date_formats.is_empty()
            && self.datetime_formats.is_empty()
            && self.time_formats.is_empty()
        {
            return Err(SheetError::configuration(
                "at least one date, datetime or time format is required",
            ));
        }

        Ok(())
    }
}
