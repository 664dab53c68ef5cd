//! Value frequency ranking for categorical columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::table::Column;

/// A distinct value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// The most frequent values of a column.
///
/// Values are compared by their display form. Ranking is by count descending;
/// equal counts keep the order in which the values first appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFrequencies {
    pub column: String,
    /// Number of non-missing cells
    pub total: u64,
    /// Number of distinct non-missing values
    pub distinct: u64,
    pub top: Vec<ValueCount>,
}

impl ValueFrequencies {
    pub fn from_column(column: &Column, top_n: usize) -> Self {
        // value -> (count, first position)
        let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
        let mut total = 0;

        for (position, value) in column.present().enumerate() {
            total += 1;
            counts
                .entry(value.to_string())
                .and_modify(|(count, _)| *count += 1)
                .or_insert((1, position));
        }

        let distinct = counts.len() as u64;
        let mut ranked: Vec<(String, u64, usize)> = counts
            .into_iter()
            .map(|(value, (count, first))| (value, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(top_n);

        Self {
            column: column.name().to_string(),
            total,
            distinct,
            top: ranked
                .into_iter()
                .map(|(value, count, _)| ValueCount { value, count })
                .collect(),
        }
    }

    /// The single most frequent value.
    pub fn mode(&self) -> Option<&ValueCount> {
        self.top.first()
    }
}
