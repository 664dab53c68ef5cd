//! In-memory table model consumed by the classifier.
//!
//! A [`Table`] is an ordered list of [`Column`]s of equal length. Construction
//! validates the shape and normalizes column names so that every column can be
//! addressed by a unique, non-empty name:
//!
//! - blank names are replaced with `Column_{n}` (1-based position)
//! - repeated names get a `.1`, `.2`, ... suffix in order of appearance
//!
//! ```rust
//! use sheet_sense::table::{Column, Table};
//!
//! let table = Table::try_new(vec![
//!     Column::numbers("Amount", [Some(100.0), Some(200.0)]),
//!     Column::text("", [Some("East"), None]),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.column_names(), vec!["Amount", "Column_2"]);
//! ```

mod fingerprint;
mod value;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};

pub use fingerprint::Fingerprint;
pub use value::CellValue;

/// A named, ordered sequence of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<CellValue>,
}

impl Column {
    /// Creates a column from already-tagged cells.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a text column; `None` entries become missing cells.
    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::new(
            name,
            values.into_iter().map(CellValue::text_or_missing).collect(),
        )
    }

    /// Creates a numeric column; `None` and NaN entries become missing cells.
    pub fn numbers<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::new(
            name,
            values.into_iter().map(CellValue::number_or_missing).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the non-missing cells.
    pub fn present(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_missing())
    }

    /// Number of non-missing cells.
    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    pub(crate) fn replace_values(&mut self, values: Vec<CellValue>) {
        self.values = values;
    }
}

/// An ordered collection of equally long columns with unique names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table, validating its shape and normalizing column names.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::MalformedTable`] when columns differ in length.
    pub fn try_new(mut columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);

        for (position, column) in columns.iter().enumerate() {
            if column.len() != row_count {
                return Err(SheetError::malformed(format!(
                    "column {} ('{}') has {} rows, expected {row_count}",
                    position + 1,
                    column.name,
                    column.len()
                )));
            }
        }

        normalize_names(&mut columns);

        Ok(Self { columns, row_count })
    }

    /// A table with no columns.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a column, failing with [`SheetError::ColumnNotFound`].
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| SheetError::ColumnNotFound {
            column: name.to_string(),
        })
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    /// Content fingerprint over column names and tagged cell values.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(self)
    }
}

fn normalize_names(columns: &mut [Column]) {
    for (position, column) in columns.iter_mut().enumerate() {
        let trimmed = column.name.trim();
        if trimmed.is_empty() {
            column.name = format!("Column_{}", position + 1);
        } else if trimmed.len() != column.name.len() {
            column.name = trimmed.to_string();
        }
    }

    let mut seen: HashSet<String> = HashSet::with_capacity(columns.len());
    for column in columns.iter_mut() {
        if seen.insert(column.name.clone()) {
            continue;
        }
        let mut suffix = 1;
        let unique = loop {
            let candidate = format!("{}.{suffix}", column.name);
            if !seen.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        seen.insert(unique.clone());
        column.name = unique;
    }
}
