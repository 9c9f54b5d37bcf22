//! Data source interfaces and built-in sources.
//!
//! A `DataSource` produces one complete `SourceSnapshot` per `load` call. Sources
//! absorb per-cell parse problems (blank or unparseable dates become `None`) and
//! only fail for whole-table problems: unreachable endpoints, unreadable files,
//! or missing required columns.

use chrono::Utc;
use std::sync::Arc;

use crate::data::{Record, SourceSnapshot};
use crate::errors::ReportError;
use crate::types::SourceId;

/// Day-first date cell parsing.
pub mod dates;
/// Source implementation modules.
pub mod sources;
/// CSV table parsing and column resolution.
pub mod table;

pub use sources::file_csv::CsvFileSource;
pub use sources::http_csv::HttpCsvSource;

/// Report-facing data source interface.
///
/// `load` must be all-or-nothing: either a full snapshot or an error, never a
/// partially populated table.
pub trait DataSource: Send + Sync {
    /// Stable source identifier used in snapshots and error messages.
    fn id(&self) -> &str;
    /// Fetch and parse the full table.
    fn load(&self) -> Result<SourceSnapshot, ReportError>;
}

impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn load(&self) -> Result<SourceSnapshot, ReportError> {
        (**self).load()
    }
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn load(&self) -> Result<SourceSnapshot, ReportError> {
        (**self).load()
    }
}

/// In-memory data source for tests and small datasets.
pub struct InMemorySource {
    id: SourceId,
    records: Arc<Vec<Record>>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<Record>) -> Self {
        Self {
            id: id.into(),
            records: Arc::new(records),
        }
    }
}

impl DataSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<SourceSnapshot, ReportError> {
        Ok(SourceSnapshot {
            source_id: self.id.clone(),
            records: self.records.as_ref().clone(),
            unparsed_dates: 0,
            fetched_at: Utc::now(),
        })
    }
}

/// Build a snapshot from a CSV payload already in memory.
pub(crate) fn snapshot_from_csv(
    source_id: &str,
    payload: &str,
    strip_marks: bool,
) -> Result<SourceSnapshot, ReportError> {
    let table = table::parse_table(source_id, payload, strip_marks)?;
    Ok(SourceSnapshot {
        source_id: source_id.to_string(),
        records: table.records,
        unparsed_dates: table.unparsed_dates,
        fetched_at: Utc::now(),
    })
}
