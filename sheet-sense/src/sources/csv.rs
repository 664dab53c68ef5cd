//! CSV file source implementation.

use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, DataFrame, SessionContext};
use tracing::{info, instrument};

use super::{ensure_files_exist, expand_globs, file_extension, TableSource};
use crate::error::{Result, SheetError};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Escape character (default: None)
    pub escape: Option<u8>,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            schema_infer_max_records: 1000,
        }
    }
}

/// A delimited text file source.
///
/// # Examples
///
/// ```rust,no_run
/// use sheet_sense::sources::{CsvOptions, CsvSource, TableSource};
///
/// # async fn example() -> sheet_sense::error::Result<()> {
/// // Simple CSV file
/// let table = CsvSource::new("data/tickets.csv")?.load().await?;
///
/// // Tab separated export without a header row
/// let options = CsvOptions {
///     delimiter: b'\t',
///     has_header: false,
///     ..Default::default()
/// };
/// let table = CsvSource::with_options("data/tickets.tsv", options)?.load().await?;
///
/// // Several monthly exports read as one table
/// let table = CsvSource::from_glob("data/2024-*.csv")?.load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    paths: Vec<String>,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source from a single file path.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Result<Self> {
        let path: String = path.into();
        if path.trim().is_empty() {
            return Err(SheetError::configuration("CSV path must not be empty"));
        }
        Self::from_paths_with_options(vec![path], options)
    }

    /// Creates a CSV source from multiple file paths sharing one schema.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        Self::from_paths_with_options(paths, CsvOptions::default())
    }

    /// Creates a source from multiple file paths with custom options.
    pub fn from_paths_with_options(paths: Vec<String>, options: CsvOptions) -> Result<Self> {
        if paths.is_empty() {
            return Err(SheetError::configuration(
                "At least one path must be provided",
            ));
        }
        Ok(Self { paths, options })
    }

    /// Creates a CSV source from a glob pattern.
    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        let paths = expand_globs(&[pattern.into()])?;
        Self::from_paths(paths)
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

#[async_trait]
impl TableSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        source.type = "csv",
        source.files = self.paths.len(),
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn read(&self, ctx: &SessionContext) -> Result<DataFrame> {
        ensure_files_exist("csv", &self.paths)?;

        info!(
            source.paths = ?self.paths,
            csv.delimiter = %self.options.delimiter as char,
            csv.has_header = self.options.has_header,
            "Reading CSV data source"
        );

        let extension = file_extension(&self.paths[0]).unwrap_or_else(|| ".csv".to_string());

        let mut csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        if let Some(escape) = self.options.escape {
            csv_options = csv_options.escape(escape);
        }
        if let Some(comment) = self.options.comment {
            csv_options = csv_options.comment(comment);
        }

        let df = ctx.read_csv(self.paths.clone(), csv_options).await?;
        Ok(df)
    }

    fn description(&self) -> String {
        if self.paths.len() == 1 {
            format!("CSV file: {}", self.paths[0])
        } else {
            format!("CSV files: {} files", self.paths.len())
        }
    }
}
