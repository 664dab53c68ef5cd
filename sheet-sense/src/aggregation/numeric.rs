//! Numeric column summaries.

use serde::{Deserialize, Serialize};

use crate::classifier::coercion::coerce_number;
use crate::table::Column;

/// Count, sum, mean, min and max of a numeric column.
///
/// Computed over cells that coerce to a number; everything else is skipped.
/// `mean`, `min` and `max` are `None` when no cell contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: u64,
    pub sum: f64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn from_column(column: &Column) -> Self {
        let mut state = NumericState::default();
        for value in column.values().iter().filter_map(coerce_number) {
            state.update(value);
        }
        state.finish(column.name())
    }
}

#[derive(Debug, Default)]
struct NumericState {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumericState {
    fn update(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    fn finish(self, column: &str) -> NumericSummary {
        let mean = if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        };

        NumericSummary {
            column: column.to_string(),
            count: self.count,
            sum: self.sum,
            mean,
            min: self.min,
            max: self.max,
        }
    }
}
