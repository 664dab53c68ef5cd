//! Error types for the sheet-sense library.
//!
//! All fallible operations return [`SheetError`]. Classification itself never
//! fails on cell contents; errors come from malformed tables, loaders and
//! configuration.

use thiserror::Error;

/// The main error type for the sheet-sense library.
#[derive(Error, Debug)]
pub enum SheetError {
    /// The table's shape is inconsistent (e.g. columns of differing length).
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Parquet")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A column requested by name does not exist in the table.
    #[error("Column '{column}' not found in table")]
    ColumnNotFound { column: String },

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, SheetError>`.
pub type Result<T> = std::result::Result<T, SheetError>;

impl SheetError {
    /// Creates a malformed table error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTable(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with an underlying cause.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SheetError::malformed("column 'b' has 2 rows, expected 3");
        assert_eq!(
            err.to_string(),
            "Malformed table: column 'b' has 2 rows, expected 3"
        );

        let err = SheetError::ColumnNotFound {
            column: "Amount".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'Amount' not found in table");
    }

    #[test]
    fn test_data_source_error_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err = SheetError::data_source_with_source("csv", "failed to open", Box::new(io));

        assert_eq!(err.to_string(), "Data source error: failed to open");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SheetError = parse_err.into();
        assert!(matches!(err, SheetError::Serialization(_)));
    }
}
