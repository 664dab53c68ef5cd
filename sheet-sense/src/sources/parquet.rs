//! Parquet file source implementation.

use std::sync::Arc;

use arrow::datatypes::Schema;
use async_trait::async_trait;
use datafusion::prelude::{DataFrame, ParquetReadOptions, SessionContext};
use tracing::{info, instrument};

use super::{ensure_files_exist, expand_globs, file_extension, TableSource};
use crate::error::{Result, SheetError};

/// Options for configuring Parquet file reading.
#[derive(Debug, Clone)]
pub struct ParquetOptions {
    /// Schema to use (if None, will be read from file metadata)
    pub schema: Option<Arc<Schema>>,
    /// Whether to use pruning based on Parquet statistics
    pub enable_pruning: bool,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            schema: None,
            enable_pruning: true,
        }
    }
}

/// A Parquet file source.
///
/// Logical date and timestamp columns arrive as native `Timestamp` cells,
/// so they are classified without any text parsing.
///
/// ```rust,no_run
/// use sheet_sense::sources::{ParquetSource, TableSource};
///
/// # async fn example() -> sheet_sense::error::Result<()> {
/// let table = ParquetSource::new("data/incidents.parquet")?.load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ParquetSource {
    paths: Vec<String>,
    options: ParquetOptions,
}

impl ParquetSource {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, ParquetOptions::default())
    }

    pub fn with_options(path: impl Into<String>, options: ParquetOptions) -> Result<Self> {
        let path: String = path.into();
        if path.trim().is_empty() {
            return Err(SheetError::configuration("Parquet path must not be empty"));
        }
        Self::from_paths_with_options(vec![path], options)
    }

    /// Creates a Parquet source from multiple file paths.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        Self::from_paths_with_options(paths, ParquetOptions::default())
    }

    /// Creates a source from multiple file paths with custom options.
    pub fn from_paths_with_options(paths: Vec<String>, options: ParquetOptions) -> Result<Self> {
        if paths.is_empty() {
            return Err(SheetError::configuration(
                "At least one path must be provided",
            ));
        }
        Ok(Self { paths, options })
    }

    /// Creates a Parquet source from a glob pattern.
    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        let paths = expand_globs(&[pattern.into()])?;
        Self::from_paths(paths)
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

#[async_trait]
impl TableSource for ParquetSource {
    #[instrument(skip(self, ctx), fields(
        source.type = "parquet",
        source.files = self.paths.len(),
        parquet.pruning = self.options.enable_pruning
    ))]
    async fn read(&self, ctx: &SessionContext) -> Result<DataFrame> {
        ensure_files_exist("parquet", &self.paths)?;

        info!(source.paths = ?self.paths, "Reading Parquet data source");

        let extension =
            file_extension(&self.paths[0]).unwrap_or_else(|| ".parquet".to_string());

        let mut read_options =
            ParquetReadOptions::default().parquet_pruning(self.options.enable_pruning);
        read_options.file_extension = &extension;

        if let Some(schema) = &self.options.schema {
            read_options = read_options.schema(schema.as_ref());
        }

        let df = ctx.read_parquet(self.paths.clone(), read_options).await?;
        Ok(df)
    }

    fn description(&self) -> String {
        if self.paths.len() == 1 {
            format!("Parquet file: {}", self.paths[0])
        } else {
            format!("Parquet files: {} files", self.paths.len())
        }
    }
}
