//! Prelude for commonly used types and traits in sheet-sense.

pub use crate::aggregation::{AggregationConfig, TableSummary};
pub use crate::classifier::{
    Classification, ClassificationCache, ClassifierConfig, Role, RoleClassifier, RolePartition,
};
pub use crate::error::{Result, SheetError};
pub use crate::logging::LogConfig;
pub use crate::sources::{CsvSource, ParquetSource, TableSource};
pub use crate::table::{CellValue, Column, Table};
