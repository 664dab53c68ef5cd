//! Monthly counts for date columns.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::table::{CellValue, Column};

/// Number of dated rows falling in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// Chronological month buckets of a date column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub column: String,
    pub buckets: Vec<MonthBucket>,
}

impl MonthlyTrend {
    /// Buckets a column by month.
    ///
    /// `normalized` holds the parsed dates of a column classified from text;
    /// without it only native timestamp cells are counted.
    pub fn from_column(column: &Column, normalized: Option<&[Option<NaiveDateTime>]>) -> Self {
        match normalized {
            Some(values) => Self::from_dates(column.name(), values.iter().flatten().copied()),
            None => Self::from_dates(
                column.name(),
                column.values().iter().filter_map(|v| match v {
                    CellValue::Timestamp(ts) => Some(*ts),
                    _ => None,
                }),
            ),
        }
    }

    pub fn from_dates(
        column: impl Into<String>,
        dates: impl IntoIterator<Item = NaiveDateTime>,
    ) -> Self {
        let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for date in dates {
            *counts.entry((date.year(), date.month())).or_default() += 1;
        }

        Self {
            column: column.into(),
            buckets: counts
                .into_iter()
                .map(|((year, month), count)| MonthBucket { year, month, count })
                .collect(),
        }
    }

    /// Total number of dated rows.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// The month with the most rows; the earliest wins a tie.
    pub fn peak(&self) -> Option<&MonthBucket> {
        self.buckets
            .iter()
            .reduce(|best, b| if b.count > best.count { b } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_native_timestamps_are_bucketed_chronologically() {
        let column = Column::new(
            "Created",
            vec![
                CellValue::Timestamp(date(2024, 2, 10)),
                CellValue::Timestamp(date(2023, 12, 31)),
                CellValue::Missing,
                CellValue::Timestamp(date(2024, 2, 1)),
                CellValue::Timestamp(date(2024, 1, 5)),
            ],
        );
        let trend = MonthlyTrend::from_column(&column, None);

        let months: Vec<(i32, u32, u64)> = trend
            .buckets
            .iter()
            .map(|b| (b.year, b.month, b.count))
            .collect();
        assert_eq!(months, vec![(2023, 12, 1), (2024, 1, 1), (2024, 2, 2)]);
        assert_eq!(trend.total(), 4);
        assert_eq!(trend.peak().map(|b| (b.year, b.month)), Some((2024, 2)));
    }

    #[test]
    fn test_normalized_values_take_precedence() {
        let column = Column::text("Date", [Some("2024-01-05"), Some("garbage"), None]);
        let normalized = [Some(date(2024, 1, 5)), None, None];
        let trend = MonthlyTrend::from_column(&column, Some(&normalized));

        assert_eq!(
            trend.buckets,
            vec![MonthBucket {
                year: 2024,
                month: 1,
                count: 1
            }]
        );
    }

    #[test]
    fn test_text_without_normalization_is_ignored() {
        let column = Column::text("Date", [Some("2024-01-05")]);
        let trend = MonthlyTrend::from_column(&column, None);
        assert!(trend.buckets.is_empty());
        assert!(trend.peak().is_none());
    }
}
