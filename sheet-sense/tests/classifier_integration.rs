//! Integration tests for the column role classifier.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use sheet_sense::classifier::{
    ClassificationCache, DecisionRule, Role, RoleClassifier, RolePartition,
};
use sheet_sense::table::{CellValue, Column, Table};

fn ticket_export() -> Table {
    Table::try_new(vec![
        Column::text("Date", [Some("2024-01-05"), Some("2024-02-10"), None]),
        Column::numbers("Amount", [Some(100.0), Some(200.0), Some(150.0)]),
        Column::text("Status", [Some("Closed"), Some("Open"), Some("Closed")]),
        Column::text("Agent", [Some("J. Smith"), Some("A. Lee"), Some("J. Smith")]),
        Column::text("Region", [Some("East"), Some("West"), Some("East")]),
    ])
    .unwrap()
}

/// `good` parseable values followed by `total - good` unparseable ones.
fn mixed_column(name: &str, good: usize, total: usize, good_value: impl Fn(usize) -> String) -> Column {
    let values = (0..total).map(|i| {
        if i < good {
            Some(good_value(i))
        } else {
            Some(format!("unknown-{i}x"))
        }
    });
    Column::text(name, values)
}

fn dates(i: usize) -> String {
    format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1)
}

fn numbers(i: usize) -> String {
    format!("{}.5", i * 3)
}

fn assert_total_and_disjoint(table: &Table, partition: &RolePartition) {
    let mut seen = HashSet::new();
    for (_, name) in partition.iter() {
        assert!(seen.insert(name.to_string()), "{name} assigned twice");
    }
    let expected: HashSet<String> = table.column_names().into_iter().map(String::from).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_end_to_end_ticket_export() {
    let table = ticket_export();
    let classification = RoleClassifier::new().classify(&table);
    let partition = classification.partition();

    assert_eq!(partition.date, ["Date"]);
    assert_eq!(partition.numeric, ["Amount"]);
    assert_eq!(partition.status, ["Status"]);
    assert_eq!(partition.identifier, ["Agent"]);
    assert_eq!(partition.categorical, ["Region"]);
    assert_total_and_disjoint(&table, partition);

    let normalized = classification.normalized("Date").unwrap();
    assert_eq!(
        normalized,
        [
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0),
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap().and_hms_opt(0, 0, 0),
            None,
        ]
    );

    // The caller's table is untouched.
    assert_eq!(
        table.column("Date").unwrap().values()[0],
        CellValue::Text("2024-01-05".into())
    );
}

#[test]
fn test_classification_is_deterministic() {
    let table = ticket_export();
    let classifier = RoleClassifier::new();

    let first = classifier.classify(&table);
    let second = classifier.classify(&table);

    assert_eq!(first, second);
    assert_eq!(first.partition(), second.partition());
}

#[test]
fn test_native_numbers_outrank_status_name() {
    let table = Table::try_new(vec![Column::numbers(
        "Status",
        [Some(1.0), Some(0.0), Some(1.0), None],
    )])
    .unwrap();
    let classification = RoleClassifier::new().classify(&table);

    assert_eq!(classification.role_of("Status"), Some(Role::Numeric));
    assert_eq!(
        classification.column("Status").unwrap().rule,
        DecisionRule::NativeNumeric
    );
}

#[test]
fn test_date_threshold_boundary() {
    let classifier = RoleClassifier::new();

    let at_threshold =
        Table::try_new(vec![mixed_column("Created_Date", 60, 100, dates)]).unwrap();
    let classification = classifier.classify(&at_threshold);
    assert_eq!(classification.role_of("Created_Date"), Some(Role::Date));
    let details = classification.column("Created_Date").unwrap();
    assert_eq!(details.rule, DecisionRule::DateKeywordParse);
    assert!((details.date_fraction.unwrap() - 0.6).abs() < 1e-12);

    let below = Table::try_new(vec![mixed_column("Created_Date", 59, 100, dates)]).unwrap();
    let classification = classifier.classify(&below);
    assert_eq!(classification.role_of("Created_Date"), Some(Role::Categorical));
    assert_eq!(
        classification.column("Created_Date").unwrap().rule,
        DecisionRule::Fallback
    );
    assert!(classification.normalized("Created_Date").is_none());
}

#[test]
fn test_numeric_threshold_boundary() {
    let classifier = RoleClassifier::new();

    let at_threshold = Table::try_new(vec![mixed_column("Score", 80, 100, numbers)]).unwrap();
    let classification = classifier.classify(&at_threshold);
    assert_eq!(classification.role_of("Score"), Some(Role::Numeric));
    assert_eq!(
        classification.column("Score").unwrap().rule,
        DecisionRule::NumericCoercion
    );

    let below = Table::try_new(vec![mixed_column("Score", 79, 100, numbers)]).unwrap();
    let classification = classifier.classify(&below);
    assert_eq!(classification.role_of("Score"), Some(Role::Categorical));
}

#[test]
fn test_status_vocabulary_ignores_case() {
    for values in [
        ["Yes", "No", "Closed"],
        ["YES", "no", "cLoSeD"],
        ["yes", "NO", "closed"],
    ] {
        let table =
            Table::try_new(vec![Column::text("Resolution", values.map(Some))]).unwrap();
        let classification = RoleClassifier::new().classify(&table);
        assert_eq!(
            classification.role_of("Resolution"),
            Some(Role::Status),
            "{values:?}"
        );
    }
}

#[test]
fn test_identifier_fallback() {
    let table = Table::try_new(vec![Column::text(
        "Employee_Ref",
        [Some("Jane Doe"), Some("Raj Patel"), Some("Li Wei")],
    )])
    .unwrap();
    let classification = RoleClassifier::new().classify(&table);

    assert_eq!(classification.role_of("Employee_Ref"), Some(Role::Identifier));
}

#[test]
fn test_default_categorical() {
    let table = Table::try_new(vec![Column::text(
        "Region",
        [Some("North"), Some("South"), Some("East")],
    )])
    .unwrap();
    let classification = RoleClassifier::new().classify(&table);

    assert_eq!(classification.role_of("Region"), Some(Role::Categorical));
    assert_eq!(
        classification.column("Region").unwrap().rule,
        DecisionRule::Fallback
    );
}

#[test]
fn test_partition_covers_awkward_tables() {
    let table = Table::try_new(vec![
        Column::text("", [Some("a"), None]),
        Column::text("", [None::<&str>, None]),
        Column::text("Amount", [Some("1"), Some("2")]),
        Column::text("Amount", [Some("open"), Some("x")]),
        Column::new(
            "End",
            vec![
                CellValue::Timestamp(
                    NaiveDate::from_ymd_opt(2024, 5, 1)
                        .unwrap()
                        .and_hms_opt(8, 0, 0)
                        .unwrap(),
                ),
                CellValue::Number(3.0),
            ],
        ),
    ])
    .unwrap();

    let classification = RoleClassifier::new().classify(&table);
    let partition = classification.partition();

    assert_total_and_disjoint(&table, partition);
    assert_eq!(partition.role_of("Column_2"), Some(Role::Categorical));
    assert_eq!(partition.role_of("Amount"), Some(Role::Numeric));
    assert_eq!(partition.role_of("Amount.1"), Some(Role::Status));
    // Mixed native cells: one timestamp, one number.
    assert_eq!(partition.role_of("End"), Some(Role::Categorical));
}

#[test]
fn test_normalize_after_classification() {
    let mut table = Table::try_new(vec![
        Column::text("Start", [Some("2024-01-05 08:30"), Some("n/a"), Some("2024-01-06 09:00")]),
        Column::text("Ticket", [Some("T-1"), Some("T-2"), Some("T-3")]),
    ])
    .unwrap();

    let classification = RoleClassifier::new().classify(&table);
    assert_eq!(classification.role_of("Start"), Some(Role::Date));

    let rewritten = classification.normalize_in_place(&mut table).unwrap();
    assert_eq!(rewritten, 1);

    let values = table.column("Start").unwrap().values();
    assert!(matches!(values[0], CellValue::Timestamp(_)));
    assert_eq!(values[1], CellValue::Missing);
    assert_eq!(
        table.column("Ticket").unwrap().values()[0],
        CellValue::Text("T-1".into())
    );

    // Re-classifying the normalized table sees native timestamps.
    let again = RoleClassifier::new().classify(&table);
    assert_eq!(
        again.column("Start").unwrap().rule,
        DecisionRule::NativeDate
    );
}

#[test]
fn test_custom_thresholds() {
    let classifier = RoleClassifier::builder()
        .numeric_threshold(0.5)
        .build()
        .unwrap();
    let table = Table::try_new(vec![mixed_column("Score", 50, 100, numbers)]).unwrap();

    assert_eq!(
        classifier.classify(&table).role_of("Score"),
        Some(Role::Numeric)
    );
    assert_eq!(
        RoleClassifier::new().classify(&table).role_of("Score"),
        Some(Role::Categorical)
    );
}

#[test]
fn test_cache_tracks_table_contents() {
    let classifier = RoleClassifier::new();
    let mut cache = ClassificationCache::new();

    let table = ticket_export();
    let first = cache.get_or_classify(&classifier, &table);
    let again = cache.get_or_classify(&classifier, &ticket_export());
    assert!(Arc::ptr_eq(&first, &again));

    let edited = Table::try_new(vec![Column::text(
        "Region",
        [Some("North"), Some("South"), Some("East")],
    )])
    .unwrap();
    let other = cache.get_or_classify(&classifier, &edited);
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(other.partition().categorical, ["Region"]);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.total_entries, 2);
}

#[tokio::test]
async fn test_concurrent_matches_sequential() {
    let mut columns = Vec::new();
    for i in 0..12 {
        columns.push(mixed_column(&format!("Due Date {i}"), 60 + i, 100, dates));
        columns.push(mixed_column(&format!("Score {i}"), 75 + i, 100, numbers));
    }
    let table = Arc::new(Table::try_new(columns).unwrap());
    let classifier = RoleClassifier::new();

    let sequential = classifier.classify(&table);
    let concurrent = classifier
        .classify_concurrent(Arc::clone(&table))
        .await
        .unwrap();

    assert_eq!(sequential, concurrent);
    assert_total_and_disjoint(&table, concurrent.partition());
}
