//! Column role inference engine.
//!
//! The classifier assigns every column of a [`Table`] exactly one [`Role`] by
//! walking a fixed priority chain; the first matching rule wins:
//!
//! 1. empty column (no non-missing values) → categorical
//! 2. every value is a native timestamp → date
//! 3. every value is a native number → numeric
//! 4. date-like name and at least `date_threshold` of values parse as dates → date
//! 5. at least `numeric_threshold` of values coerce to numbers → numeric
//! 6. any value is a status word → status
//! 7. identifier-like name → identifier
//! 8. otherwise → categorical
//!
//! Thresholds are fractions over non-missing cells and are inclusive.
//! Classification never mutates the input; rule 4 columns carry their parsed
//! dates in the returned [`Classification`].
//!
//! # Example
//!
//! ```rust
//! use sheet_sense::classifier::{RoleClassifier, Role};
//! use sheet_sense::table::{Column, Table};
//!
//! let table = Table::try_new(vec![
//!     Column::text("Date", [Some("2024-01-05"), Some("2024-02-10"), None]),
//!     Column::numbers("Amount", [Some(100.0), Some(200.0), Some(150.0)]),
//!     Column::text("Status", [Some("Closed"), Some("Open"), Some("Closed")]),
//!     Column::text("Agent", [Some("J. Smith"), Some("A. Lee"), Some("J. Smith")]),
//!     Column::text("Region", [Some("East"), Some("West"), Some("East")]),
//! ])
//! .unwrap();
//!
//! let classification = RoleClassifier::new().classify(&table);
//! let partition = classification.partition();
//!
//! assert_eq!(partition.date, ["Date"]);
//! assert_eq!(partition.numeric, ["Amount"]);
//! assert_eq!(partition.status, ["Status"]);
//! assert_eq!(partition.identifier, ["Agent"]);
//! assert_eq!(partition.categorical, ["Region"]);
//! assert_eq!(partition.role_of("Agent"), Some(Role::Identifier));
//! ```

mod cache;
pub(crate) mod coercion;
mod config;
mod role;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{Result, SheetError};
use crate::log_decision;
use crate::logging::{truncate_field, LogConfig};
use crate::table::{CellValue, Column, Fingerprint, Table};

pub use cache::{CacheStats, ClassificationCache};
pub use config::ClassifierConfig;
pub use role::{ColumnClassification, DecisionRule, Role, RolePartition};

use coercion::{coerce_number, DateParser};

/// Slack for comparing success fractions against thresholds.
const FRACTION_EPSILON: f64 = 1e-9;

/// Builder for [`RoleClassifier`].
#[derive(Debug, Clone, Default)]
pub struct RoleClassifierBuilder {
    config: ClassifierConfig,
    log_config: LogConfig,
}

impl RoleClassifierBuilder {
    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the minimum parsed-date fraction for date-named columns.
    pub fn date_threshold(mut self, threshold: f64) -> Self {
        self.config.date_threshold = threshold;
        self
    }

    /// Sets the minimum numeric-coercion fraction.
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.config.numeric_threshold = threshold;
        self
    }

    /// Sets the name substrings that enable date parsing.
    pub fn date_name_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.date_name_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the status vocabulary.
    pub fn status_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.status_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the name substrings that mark identifier columns.
    pub fn identifier_name_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.identifier_name_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a chrono format for date-only text.
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.config.date_formats.push(format.into());
        self
    }

    /// Sets the logging configuration.
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Validates the configuration and builds the classifier.
    pub fn build(self) -> Result<RoleClassifier> {
        Ok(RoleClassifier::from_config(self.config)?.with_log_config(self.log_config))
    }
}

/// The column role classifier.
///
/// Cheap to clone; holds only its configuration in prepared form.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    config: ClassifierConfig,
    date_keywords: Vec<String>,
    identifier_keywords: Vec<String>,
    status_values: HashSet<String>,
    date_parser: DateParser,
    config_fingerprint: Fingerprint,
    log_config: LogConfig,
}

impl RoleClassifier {
    /// Creates a new builder seeded with the default configuration.
    pub fn builder() -> RoleClassifierBuilder {
        RoleClassifierBuilder::default()
    }

    /// Creates a classifier with the default configuration.
    pub fn new() -> Self {
        Self::prepare(ClassifierConfig::default(), Fingerprint::of_bytes(b"default"))
    }

    /// Creates a classifier from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Configuration`] if the configuration is invalid.
    pub fn from_config(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        let fingerprint = if config == ClassifierConfig::default() {
            Fingerprint::of_bytes(b"default")
        } else {
            Fingerprint::of_bytes(&serde_json::to_vec(&config)?)
        };
        Ok(Self::prepare(config, fingerprint))
    }

    fn prepare(config: ClassifierConfig, config_fingerprint: Fingerprint) -> Self {
        let lowered = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect()
        };

        Self {
            date_keywords: lowered(&config.date_name_keywords),
            identifier_keywords: lowered(&config.identifier_name_keywords),
            status_values: lowered(&config.status_values).into_iter().collect(),
            date_parser: DateParser::new(
                &config.date_formats,
                &config.datetime_formats,
                &config.time_formats,
            ),
            config_fingerprint,
            config,
            log_config: LogConfig::default(),
        }
    }

    /// Replaces the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Digest of the configuration, part of the memoization key.
    pub fn config_fingerprint(&self) -> &Fingerprint {
        &self.config_fingerprint
    }

    /// Classifies every column of `table`.
    #[instrument(skip(self, table), fields(columns = table.num_columns(), rows = table.num_rows()))]
    pub fn classify(&self, table: &Table) -> Classification {
        info!(
            columns = table.num_columns(),
            rows = table.num_rows(),
            "Starting column role classification"
        );

        let outcomes = table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, column)| self.classify_column(index, column))
            .collect();

        let classification = Classification::assemble(outcomes);
        classification.log_summary();
        classification
    }

    /// Classifies columns on blocking worker threads.
    ///
    /// Columns are split into one chunk per CPU; each column's result lands in
    /// its own slot, so the output equals [`RoleClassifier::classify`].
    #[instrument(skip(self, table), fields(columns = table.num_columns(), rows = table.num_rows()))]
    pub async fn classify_concurrent(&self, table: Arc<Table>) -> Result<Classification> {
        let num_columns = table.num_columns();
        if num_columns == 0 {
            return Ok(Classification::assemble(Vec::new()));
        }

        let workers = num_cpus::get().clamp(1, num_columns);
        let chunk_size = num_columns.div_ceil(workers);

        info!(
            columns = num_columns,
            workers, chunk_size, "Starting concurrent column role classification"
        );

        let mut handles = Vec::with_capacity(workers);
        for start in (0..num_columns).step_by(chunk_size) {
            let end = (start + chunk_size).min(num_columns);
            let table = Arc::clone(&table);
            let classifier = self.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                (start..end)
                    .map(|index| classifier.classify_column(index, &table.columns()[index]))
                    .collect::<Vec<_>>()
            }));
        }

        let mut slots: Vec<Option<ColumnOutcome>> = (0..num_columns).map(|_| None).collect();
        for handle in handles {
            let outcomes = handle
                .await
                .map_err(|e| SheetError::internal(format!("Task join error: {e}")))?;
            for outcome in outcomes {
                let index = outcome.classification.index;
                slots[index] = Some(outcome);
            }
        }

        let outcomes = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    SheetError::internal(format!("column {index} was not classified"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let classification = Classification::assemble(outcomes);
        classification.log_summary();
        Ok(classification)
    }

    /// Runs the priority chain for a single column.
    fn classify_column(&self, index: usize, column: &Column) -> ColumnOutcome {
        let name = column.name();
        let lowered_name = name.to_lowercase();
        let non_missing = column.present_count();

        let mut decision = ColumnClassification {
            name: name.to_string(),
            index,
            role: Role::Categorical,
            rule: DecisionRule::EmptyColumn,
            non_missing,
            date_fraction: None,
            numeric_fraction: None,
        };

        let first_kind = column.present().next().map_or("missing", CellValue::kind);

        let outcome = |decision: ColumnClassification,
                       normalized: Option<Vec<Option<NaiveDateTime>>>| {
            log_decision!(
                self.log_config,
                column = %truncate_field(&decision.name, self.log_config.max_field_length),
                role = %decision.role,
                rule = decision.rule.as_str(),
                non_missing = decision.non_missing,
                first_kind,
                date_fraction = ?decision.date_fraction,
                numeric_fraction = ?decision.numeric_fraction,
                "Classified column"
            );
            ColumnOutcome {
                classification: decision,
                normalized,
            }
        };

        if non_missing == 0 {
            return outcome(decision, None);
        }

        if column
            .present()
            .all(|v| matches!(v, CellValue::Timestamp(_)))
        {
            decision.role = Role::Date;
            decision.rule = DecisionRule::NativeDate;
            return outcome(decision, None);
        }

        if column.present().all(|v| matches!(v, CellValue::Number(_))) {
            decision.role = Role::Numeric;
            decision.rule = DecisionRule::NativeNumeric;
            return outcome(decision, None);
        }

        if contains_any(&lowered_name, &self.date_keywords) {
            let parsed: Vec<Option<NaiveDateTime>> = column
                .values()
                .iter()
                .map(|v| self.date_parser.coerce(v))
                .collect();
            let successes = parsed.iter().filter(|p| p.is_some()).count();
            let fraction = successes as f64 / non_missing as f64;
            decision.date_fraction = Some(fraction);

            if meets_threshold(successes, fraction, self.config.date_threshold) {
                decision.role = Role::Date;
                decision.rule = DecisionRule::DateKeywordParse;
                return outcome(decision, Some(parsed));
            }
        }

        let numeric_successes = column
            .present()
            .filter(|v| coerce_number(v).is_some())
            .count();
        let numeric_fraction = numeric_successes as f64 / non_missing as f64;
        decision.numeric_fraction = Some(numeric_fraction);
        if meets_threshold(
            numeric_successes,
            numeric_fraction,
            self.config.numeric_threshold,
        ) {
            decision.role = Role::Numeric;
            decision.rule = DecisionRule::NumericCoercion;
            return outcome(decision, None);
        }

        let has_status_value = column.present().filter_map(CellValue::as_text).any(|text| {
            self.status_values
                .contains(text.trim().to_lowercase().as_str())
        });
        if has_status_value {
            decision.role = Role::Status;
            decision.rule = DecisionRule::StatusVocabulary;
            return outcome(decision, None);
        }

        if contains_any(&lowered_name, &self.identifier_keywords) {
            decision.role = Role::Identifier;
            decision.rule = DecisionRule::IdentifierKeyword;
            return outcome(decision, None);
        }

        decision.role = Role::Categorical;
        decision.rule = DecisionRule::Fallback;
        outcome(decision, None)
    }
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

// A 0-success column never matches, even with a zero threshold.
fn meets_threshold(successes: usize, fraction: f64, threshold: f64) -> bool {
    successes > 0 && fraction + FRACTION_EPSILON >= threshold
}

struct ColumnOutcome {
    classification: ColumnClassification,
    normalized: Option<Vec<Option<NaiveDateTime>>>,
}

/// Parsed date values for a column that was classified from text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedColumn {
    /// Column name
    pub name: String,
    /// One entry per row; `None` where the cell was missing or unparseable
    pub values: Vec<Option<NaiveDateTime>>,
}

/// Result of classifying a table.
///
/// Holds the role partition, per-column decision details and the parsed
/// dates of every column classified by the date-keyword rule. The original
/// table is never modified; use [`Classification::normalize_in_place`] to opt
/// into rewriting those columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    partition: RolePartition,
    columns: Vec<ColumnClassification>,
    normalized: Vec<NormalizedColumn>,
}

impl Classification {
    fn assemble(outcomes: Vec<ColumnOutcome>) -> Self {
        let mut partition = RolePartition::default();
        let mut columns = Vec::with_capacity(outcomes.len());
        let mut normalized = Vec::new();

        for outcome in outcomes {
            let decision = outcome.classification;
            partition.push(decision.role, decision.name.clone());
            if let Some(values) = outcome.normalized {
                normalized.push(NormalizedColumn {
                    name: decision.name.clone(),
                    values,
                });
            }
            columns.push(decision);
        }

        Self {
            partition,
            columns,
            normalized,
        }
    }

    fn log_summary(&self) {
        info!(
            numeric = self.partition.numeric.len(),
            categorical = self.partition.categorical.len(),
            date = self.partition.date.len(),
            identifier = self.partition.identifier.len(),
            status = self.partition.status.len(),
            normalized = self.normalized.len(),
            "Completed column role classification"
        );
    }

    pub fn partition(&self) -> &RolePartition {
        &self.partition
    }

    pub fn into_partition(self) -> RolePartition {
        self.partition
    }

    /// Per-column decisions in table order.
    pub fn columns(&self) -> &[ColumnClassification] {
        &self.columns
    }

    /// Decision details for a single column.
    pub fn column(&self, name: &str) -> Option<&ColumnClassification> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Role assigned to the named column.
    pub fn role_of(&self, name: &str) -> Option<Role> {
        self.column(name).map(|c| c.role)
    }

    /// Columns whose text values were parsed into dates.
    pub fn normalized_columns(&self) -> &[NormalizedColumn] {
        &self.normalized
    }

    /// Parsed dates for the named column, if it was classified from text.
    pub fn normalized(&self, name: &str) -> Option<&[Option<NaiveDateTime>]> {
        self.normalized
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Rewrites the parsed-date columns of `table` as timestamp cells.
    ///
    /// Unparseable cells become missing. Returns the number of rewritten
    /// columns.
    ///
    /// # Errors
    ///
    /// Fails if `table` lacks a normalized column or its row count differs
    /// from the classified table.
    pub fn normalize_in_place(&self, table: &mut Table) -> Result<usize> {
        let rows = table.num_rows();
        for normalized in &self.normalized {
            if table.column(&normalized.name).is_none() {
                return Err(SheetError::ColumnNotFound {
                    column: normalized.name.clone(),
                });
            }
            if normalized.values.len() != rows {
                return Err(SheetError::malformed(format!(
                    "column '{}' was classified with {} rows, table has {rows}",
                    normalized.name,
                    normalized.values.len()
                )));
            }
        }

        for normalized in &self.normalized {
            if let Some(column) = table.column_mut(&normalized.name) {
                column.replace_values(
                    normalized
                        .values
                        .iter()
                        .map(|v| v.map_or(CellValue::Missing, CellValue::Timestamp))
                        .collect(),
                );
            }
        }

        info!(
            columns = self.normalized.len(),
            "Normalized parsed date columns in place"
        );
        Ok(self.normalized.len())
    }
}
