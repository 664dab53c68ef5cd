//! Summary statistics driven by a classification.
//!
//! Each role feeds one kind of summary:
//!
//! | role | summary |
//! |---|---|
//! | numeric | [`NumericSummary`] (count, sum, mean, min, max) |
//! | categorical | [`ValueFrequencies`] (top-N values) |
//! | date | [`MonthlyTrend`] (rows per calendar month) |
//!
//! Identifier and status columns are not summarized.
//!
//! ```rust
//! use sheet_sense::aggregation::{AggregationConfig, TableSummary};
//! use sheet_sense::classifier::RoleClassifier;
//! use sheet_sense::table::{Column, Table};
//!
//! let table = Table::try_new(vec![
//!     Column::text("Date", [Some("2024-01-05"), Some("2024-02-10"), None]),
//!     Column::numbers("Amount", [Some(100.0), Some(200.0), Some(150.0)]),
//!     Column::text("Region", [Some("East"), Some("West"), Some("East")]),
//! ])
//! .unwrap();
//!
//! let classification = RoleClassifier::new().classify(&table);
//! let summary = TableSummary::compute(&table, &classification, &AggregationConfig::default()).unwrap();
//!
//! assert_eq!(summary.numeric("Amount").unwrap().sum, 450.0);
//! assert_eq!(summary.frequencies("Region").unwrap().top[0].value, "East");
//! assert_eq!(summary.trend("Date").unwrap().buckets.len(), 2);
//! ```

mod frequency;
mod numeric;
mod trend;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::classifier::Classification;
use crate::error::{Result, SheetError};
use crate::table::Table;

pub use frequency::{ValueCount, ValueFrequencies};
pub use numeric::NumericSummary;
pub use trend::{MonthBucket, MonthlyTrend};

/// Configuration for [`TableSummary::compute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Number of values kept per categorical column
    pub top_n: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

impl AggregationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(SheetError::configuration("top_n must be at least 1"));
        }
        Ok(())
    }
}

/// All per-column summaries of a classified table, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub numeric: Vec<NumericSummary>,
    pub frequencies: Vec<ValueFrequencies>,
    pub trends: Vec<MonthlyTrend>,
}

impl TableSummary {
    /// Summarizes `table` according to `classification`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Configuration`] for an invalid config and
    /// [`SheetError::ColumnNotFound`] if the classification names a column the
    /// table does not have.
    #[instrument(skip_all, fields(columns = table.num_columns(), rows = table.num_rows()))]
    pub fn compute(
        table: &Table,
        classification: &Classification,
        config: &AggregationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let partition = classification.partition();

        let numeric = partition
            .numeric
            .iter()
            .map(|name| Ok(NumericSummary::from_column(table.require_column(name)?)))
            .collect::<Result<Vec<_>>>()?;

        let frequencies = partition
            .categorical
            .iter()
            .map(|name| {
                Ok(ValueFrequencies::from_column(
                    table.require_column(name)?,
                    config.top_n,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let trends = partition
            .date
            .iter()
            .map(|name| {
                let column = table.require_column(name)?;
                Ok(MonthlyTrend::from_column(
                    column,
                    classification.normalized(name),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            numeric = numeric.len(),
            categorical = frequencies.len(),
            date = trends.len(),
            "Computed table summary"
        );

        Ok(Self {
            numeric,
            frequencies,
            trends,
        })
    }

    pub fn numeric(&self, column: &str) -> Option<&NumericSummary> {
        self.numeric.iter().find(|s| s.column == column)
    }

    pub fn frequencies(&self, column: &str) -> Option<&ValueFrequencies> {
        self.frequencies.iter().find(|s| s.column == column)
    }

    pub fn trend(&self, column: &str) -> Option<&MonthlyTrend> {
        self.trends.iter().find(|s| s.column == column)
    }
}
