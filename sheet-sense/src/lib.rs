//! # sheet-sense - Column role inference for spreadsheets
//!
//! sheet-sense looks at a table of unknown schema and decides what each column
//! *is*: a measure, a date, a category, an identifier or a status flag. The
//! resulting [`RolePartition`](classifier::RolePartition) drives the summaries
//! in [`aggregation`] without any user-supplied schema.
//!
//! ## Quick Start
//!
//! ```rust
//! use sheet_sense::prelude::*;
//!
//! let table = Table::try_new(vec![
//!     Column::text("Open Date", [Some("2024-01-05"), Some("2024-02-10"), None]),
//!     Column::numbers("Amount", [Some(100.0), Some(200.0), Some(150.0)]),
//!     Column::text("Status", [Some("Closed"), Some("Open"), Some("Closed")]),
//!     Column::text("Agent", [Some("J. Smith"), Some("A. Lee"), Some("J. Smith")]),
//!     Column::text("Region", [Some("East"), Some("West"), Some("East")]),
//! ])?;
//!
//! let classification = RoleClassifier::new().classify(&table);
//! assert_eq!(classification.role_of("Open Date"), Some(Role::Date));
//! assert_eq!(classification.role_of("Status"), Some(Role::Status));
//!
//! let summary = TableSummary::compute(&table, &classification, &AggregationConfig::default())?;
//! assert_eq!(summary.numeric("Amount").and_then(|s| s.mean), Some(150.0));
//! # Ok::<(), sheet_sense::error::SheetError>(())
//! ```
//!
//! ## Loading files
//!
//! [`sources`] reads CSV and Parquet through DataFusion and converts Arrow
//! record batches into a [`Table`](table::Table):
//!
//! ```rust,no_run
//! use sheet_sense::prelude::*;
//!
//! # async fn example() -> sheet_sense::error::Result<()> {
//! let table = CsvSource::new("exports/tickets.csv")?.load().await?;
//! let classification = RoleClassifier::new()
//!     .classify_concurrent(std::sync::Arc::new(table))
//!     .await?;
//! println!("{:?}", classification.partition());
//! # Ok(())
//! # }
//! ```
//!
//! ## Repeated classification
//!
//! [`ClassificationCache`](classifier::ClassificationCache) memoizes results by
//! table content and classifier configuration, so re-rendering the same
//! upload does not re-run coercion.
//!
//! ## Logging
//!
//! Every stage emits `tracing` events; see [`logging::setup::init_logging`]
//! for a ready-made subscriber.

pub mod aggregation;
pub mod classifier;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod sources;
pub mod table;
