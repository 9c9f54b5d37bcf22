use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use crate::types::{FieldValue, SourceId};

/// One row of the source table.
///
/// Records are never mutated after loading; the pipeline only builds views on top.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Client name.
    pub client: FieldValue,
    /// Project owner (the sheet's `GP` column).
    pub owner: FieldValue,
    /// Product line.
    pub product: FieldValue,
    /// Project name. Not filterable.
    pub project: String,
    /// Status or phase label.
    pub status: FieldValue,
    /// Date the first validation delivery happened; `None` when blank or unparseable.
    pub first_delivery_date: Option<NaiveDate>,
    /// Date of the latest status change; `None` when blank or unparseable.
    pub status_change_date: Option<NaiveDate>,
    /// Free-form observations, whitespace collapsed.
    pub notes: String,
}

/// A record plus its aging metrics relative to a reference day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgedRecord {
    /// The loaded row, unchanged.
    pub record: Record,
    /// Whole days between the first delivery and the reference day.
    pub days_since_first_delivery: Option<i64>,
    /// Whole days between the last status change and the reference day.
    pub days_since_status_change: Option<i64>,
}

/// Which aging metric a classification or tally refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingMetric {
    /// Days since the first validation delivery.
    Delivery,
    /// Days since the last status change.
    StatusChange,
}

impl AgedRecord {
    /// Return the day count for `metric`.
    pub fn age(&self, metric: AgingMetric) -> Option<i64> {
        match metric {
            AgingMetric::Delivery => self.days_since_first_delivery,
            AgingMetric::StatusChange => self.days_since_status_change,
        }
    }
}

/// Result of loading the source table once.
#[derive(Clone, Debug)]
pub struct SourceSnapshot {
    /// Source identifier that produced the records.
    pub source_id: SourceId,
    /// Parsed records in source order.
    pub records: Vec<Record>,
    /// Number of date cells that were non-blank but failed to parse.
    pub unparsed_dates: usize,
    /// When the snapshot was fetched.
    pub fetched_at: DateTime<Utc>,
}
