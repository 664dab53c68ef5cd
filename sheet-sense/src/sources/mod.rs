//! Table loaders.
//!
//! Sources read files through DataFusion and convert the resulting Arrow
//! record batches into a [`Table`] ready for classification. Cell typing is
//! decided here, once; see [`Table::from_arrow`] for the mapping.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sheet_sense::sources::{CsvSource, TableSource};
//!
//! # async fn example() -> sheet_sense::error::Result<()> {
//! let table = CsvSource::new("data/tickets.csv")?.load().await?;
//! println!("{} columns, {} rows", table.num_columns(), table.num_rows());
//! # Ok(())
//! # }
//! ```

mod batches;
mod csv;
mod parquet;

use std::fmt::Debug;

use async_trait::async_trait;
use datafusion::prelude::{DataFrame, SessionContext};
use tracing::{info, instrument};

use crate::error::{Result, SheetError};
use crate::table::Table;

pub use csv::{CsvOptions, CsvSource};
pub use parquet::{ParquetOptions, ParquetSource};

/// A loader producing a [`Table`].
#[async_trait]
pub trait TableSource: Debug + Send + Sync {
    /// Reads this source into a DataFusion data frame.
    async fn read(&self, ctx: &SessionContext) -> Result<DataFrame>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;

    /// Loads the whole source into memory using a fresh session context.
    async fn load(&self) -> Result<Table> {
        let ctx = SessionContext::new();
        self.load_with_context(&ctx).await
    }

    /// Loads the whole source into memory using `ctx`.
    async fn load_with_context(&self, ctx: &SessionContext) -> Result<Table> {
        let df = self.read(ctx).await?;
        dataframe_to_table(df, &self.description()).await
    }
}

/// Collects a data frame and converts it into a [`Table`].
#[instrument(skip(df))]
pub async fn dataframe_to_table(df: DataFrame, description: &str) -> Result<Table> {
    let schema = df.schema().inner().clone();
    let batches = df.collect().await?;
    let table = Table::from_arrow(&schema, &batches)?;

    info!(
        source = description,
        columns = table.num_columns(),
        rows = table.num_rows(),
        "Loaded table"
    );
    Ok(table)
}

/// Expands glob patterns into file paths.
pub(crate) fn expand_globs(patterns: &[String]) -> Result<Vec<String>> {
    use glob::glob;

    let mut paths = Vec::new();
    for pattern in patterns {
        let matches = glob(pattern).map_err(|e| {
            SheetError::configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        for entry in matches {
            let path = entry.map_err(|e| SheetError::Io(std::io::Error::other(e)))?;

            if path.is_file() {
                if let Some(path_str) = path.to_str() {
                    paths.push(path_str.to_string());
                }
            }
        }
    }

    if paths.is_empty() {
        return Err(SheetError::data_source(
            "file",
            "No files found matching glob patterns",
        ));
    }

    paths.sort();
    Ok(paths)
}

/// Fails with a data source error naming the first path that cannot be
/// opened. DataFusion treats a missing path as an empty listing.
pub(crate) fn ensure_files_exist(source_type: &str, paths: &[String]) -> Result<()> {
    for path in paths {
        if let Err(e) = std::fs::metadata(path) {
            return Err(SheetError::data_source_with_source(
                source_type,
                format!("cannot open '{path}'"),
                Box::new(e),
            ));
        }
    }
    Ok(())
}

/// File extension of `path` including the leading dot, if any.
pub(crate) fn file_extension(path: &str) -> Option<String> {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
}
