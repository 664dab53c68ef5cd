//! Property-based tests for the column role classifier.
//!
//! Tables are generated from a pool of cell shapes that exercise every rule:
//! ISO dates, decimal strings, status words, free text, native numbers,
//! native timestamps and missing cells. Column names are drawn from a pool
//! that includes date and identifier keywords, blanks and duplicates.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use sheet_sense::classifier::RoleClassifier;
use sheet_sense::table::{CellValue, Column, Table};

fn cell_strategy() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Missing),
        (-1.0e6..1.0e6f64).prop_map(CellValue::Number),
        (0i64..20_000).prop_map(|days| {
            let date = NaiveDate::from_num_days_from_ce_opt(738_000 + days as i32)
                .unwrap_or_default();
            CellValue::Timestamp(date.and_hms_opt(12, 0, 0).unwrap_or_default())
        }),
        (2000u32..2030, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| CellValue::Text(format!("{y}-{m:02}-{d:02}"))),
        (-10_000i32..10_000).prop_map(|n| CellValue::Text(n.to_string())),
        prop::sample::select(vec!["Open", "closed", "YES", "pending", "Done"])
            .prop_map(|s| CellValue::Text(s.to_string())),
        "[A-Za-z ]{1,12}".prop_map(CellValue::Text),
    ]
}

fn name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "", "Date", "Start Time", "Amount", "Status", "Agent", "Region", "User_ID", "Notes",
        "Amount",
    ])
    .prop_map(String::from)
}

fn table_strategy() -> impl Strategy<Value = Table> {
    (0usize..12, 0usize..25).prop_flat_map(|(num_columns, num_rows)| {
        prop::collection::vec(
            (
                name_strategy(),
                prop::collection::vec(cell_strategy(), num_rows),
            ),
            num_columns,
        )
        .prop_map(|columns| {
            Table::try_new(
                columns
                    .into_iter()
                    .map(|(name, values)| Column::new(name, values))
                    .collect(),
            )
            .unwrap_or_else(|_| Table::empty())
        })
    })
}

proptest! {
    #[test]
    fn partition_is_total_and_disjoint(table in table_strategy()) {
        let classification = RoleClassifier::new().classify(&table);
        let partition = classification.partition();

        let mut assigned = HashSet::new();
        for (_, name) in partition.iter() {
            prop_assert!(assigned.insert(name.to_string()), "{} assigned twice", name);
        }

        let expected: HashSet<String> =
            table.column_names().into_iter().map(String::from).collect();
        prop_assert_eq!(assigned, expected);
        prop_assert_eq!(partition.len(), table.num_columns());
        prop_assert_eq!(classification.columns().len(), table.num_columns());
    }

    #[test]
    fn classification_is_deterministic(table in table_strategy()) {
        let classifier = RoleClassifier::new();
        prop_assert_eq!(classifier.classify(&table), classifier.classify(&table));
    }

    #[test]
    fn classification_preserves_column_order(table in table_strategy()) {
        let classification = RoleClassifier::new().classify(&table);
        let partition = classification.partition();

        for role_names in [
            &partition.numeric,
            &partition.categorical,
            &partition.date,
            &partition.identifier,
            &partition.status,
        ] {
            let positions: Vec<usize> = role_names
                .iter()
                .filter_map(|name| table.column_names().iter().position(|c| *c == name.as_str()))
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn normalized_columns_match_table_shape(table in table_strategy()) {
        let classification = RoleClassifier::new().classify(&table);
        for normalized in classification.normalized_columns() {
            prop_assert_eq!(normalized.values.len(), table.num_rows());
            prop_assert_eq!(
                classification.role_of(&normalized.name),
                Some(sheet_sense::classifier::Role::Date)
            );
        }
    }

    #[test]
    fn concurrent_matches_sequential(table in table_strategy()) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .build()
            .unwrap();
        let classifier = RoleClassifier::new();
        let table = Arc::new(table);

        let sequential = classifier.classify(&table);
        let concurrent = runtime
            .block_on(classifier.classify_concurrent(Arc::clone(&table)))
            .unwrap();

        prop_assert_eq!(sequential, concurrent);
    }
}

#[cfg(test)]
mod edge_case_tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let classification = RoleClassifier::new().classify(&Table::empty());
        assert!(classification.partition().is_empty());
    }

    #[test]
    fn test_all_missing_columns() {
        let table = Table::try_new(vec![
            Column::new("Date", vec![CellValue::Missing; 4]),
            Column::new("User_ID", vec![CellValue::Missing; 4]),
        ])
        .unwrap();
        let partition = RoleClassifier::new().classify(&table).into_partition();
        assert_eq!(partition.categorical, ["Date", "User_ID"]);
    }
}
