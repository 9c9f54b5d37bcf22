#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner.
pub mod app;
/// Category buckets and threshold tables.
pub mod classify;
/// Output column model shared by every presenter.
pub mod columns;
/// Report and loader configuration.
pub mod config;
/// Centralized constants for sources, columns, filters, and presentation.
pub mod constants;
/// Record and snapshot types.
pub mod data;
/// XLSX export.
pub mod export;
/// Filter predicates and option discovery.
pub mod filter;
/// Snapshot caching with a freshness window.
pub mod ingestion;
/// Day-count metrics and category tallies.
pub mod metrics;
/// Terminal rendering.
pub mod render;
/// Report assembly.
pub mod report;
/// Composite record ordering.
pub mod sort;
/// Data source traits and built-in sources.
pub mod source;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

mod errors;

pub use classify::{Category, DELIVERY_AGING, STATUS_CHANGE_AGING, ThresholdTable, classify};
pub use config::{LoaderConfig, ReportConfig};
pub use data::{AgedRecord, AgingMetric, Record, SourceSnapshot};
pub use errors::ReportError;
pub use filter::{DateRange, FilterField, FilterOptions, FilterSelection, Predicate};
pub use ingestion::{Refresh, SnapshotCache};
pub use report::{Report, ReportNotice, ReportRequest, build_report, build_report_from_refresh};
pub use sort::{SortDirection, SortField, SortKey, SortPreset};
pub use source::{CsvFileSource, DataSource, HttpCsvSource, InMemorySource};
pub use types::{CellText, ColumnName, FieldValue, SourceId};
