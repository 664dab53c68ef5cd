//! Conversion from Arrow record batches into a [`Table`].

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Schema, TimeUnit, TimestampMicrosecondType};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::DateTime;
use tracing::debug;

use crate::error::{Result, SheetError};
use crate::table::{CellValue, Column, Table};

impl Table {
    /// Builds a table from record batches sharing the first batch's schema.
    ///
    /// An empty slice yields an empty table.
    pub fn from_record_batches(batches: &[RecordBatch]) -> Result<Self> {
        match batches.first() {
            Some(first) => Self::from_arrow(first.schema().as_ref(), batches),
            None => Ok(Table::empty()),
        }
    }

    /// Builds a table with the given schema, so zero-row results keep their columns.
    ///
    /// Cell mapping:
    /// - integer, float and decimal arrays become numbers
    /// - `Date32`, `Date64` and `Timestamp` arrays become timestamps
    /// - string arrays become text, blank strings become missing
    /// - anything else (booleans, times, lists, ...) becomes its display text
    /// - nulls become missing
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::MalformedTable`] when a batch's columns do not
    /// match the schema.
    pub fn from_arrow(schema: &Schema, batches: &[RecordBatch]) -> Result<Self> {
        let fields = schema.fields();
        let total_rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        let mut cells: Vec<Vec<CellValue>> = fields
            .iter()
            .map(|_| Vec::with_capacity(total_rows))
            .collect();

        for (batch_index, batch) in batches.iter().enumerate() {
            let batch_schema = batch.schema();
            if batch.num_columns() != fields.len() {
                return Err(SheetError::malformed(format!(
                    "batch {batch_index} has {} columns, expected {}",
                    batch.num_columns(),
                    fields.len()
                )));
            }

            for (i, field) in fields.iter().enumerate() {
                let batch_field = batch_schema.field(i);
                if batch_field.data_type() != field.data_type() {
                    return Err(SheetError::malformed(format!(
                        "batch {batch_index} column '{}' has type {}, expected {}",
                        field.name(),
                        batch_field.data_type(),
                        field.data_type()
                    )));
                }
                append_cells(batch.column(i), &mut cells[i])?;
            }
        }

        debug!(
            columns = fields.len(),
            rows = total_rows,
            batches = batches.len(),
            "Converted record batches to table"
        );

        let columns = fields
            .iter()
            .zip(cells)
            .map(|(field, values)| Column::new(field.name().clone(), values))
            .collect();
        Table::try_new(columns)
    }
}

fn append_cells(array: &ArrayRef, out: &mut Vec<CellValue>) -> Result<()> {
    match array.data_type() {
        data_type if data_type.is_numeric() => {
            let floats = cast(array, &DataType::Float64)?;
            let floats = floats.as_primitive::<Float64Type>();
            out.extend((0..floats.len()).map(|i| {
                if floats.is_null(i) {
                    CellValue::Missing
                } else {
                    CellValue::number_or_missing(Some(floats.value(i)))
                }
            }));
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let micros = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
            let micros = micros.as_primitive::<TimestampMicrosecondType>();
            out.extend((0..micros.len()).map(|i| {
                if micros.is_null(i) {
                    return CellValue::Missing;
                }
                DateTime::from_timestamp_micros(micros.value(i))
                    .map_or(CellValue::Missing, |dt| CellValue::Timestamp(dt.naive_utc()))
            }));
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(array, &DataType::Utf8)?;
            let strings = strings.as_string::<i32>();
            out.extend((0..strings.len()).map(|i| {
                if strings.is_null(i) {
                    return CellValue::Missing;
                }
                let value = strings.value(i);
                if value.trim().is_empty() {
                    CellValue::Missing
                } else {
                    CellValue::Text(value.to_string())
                }
            }));
        }
        _ => {
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            out.extend((0..array.len()).map(|i| {
                if array.is_null(i) {
                    CellValue::Missing
                } else {
                    CellValue::Text(formatter.value(i).to_string())
                }
            }));
        }
    }
    Ok(())
}
