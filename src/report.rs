//! Report assembly: derive, filter, classify, and sort one snapshot.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::classify::{Category, DELIVERY_AGING, STATUS_CHANGE_AGING};
use crate::data::{AgedRecord, AgingMetric, SourceSnapshot};
use crate::errors::ReportError;
use crate::filter::{FilterField, FilterOptions, FilterSelection, apply};
use crate::ingestion::Refresh;
use crate::metrics::{category_counts, derive_metrics};
use crate::sort::{SortKey, SortPreset, sort_records};
use crate::types::SourceId;

/// Informational conditions surfaced next to the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportNotice {
    /// The latest refresh failed; the table shows an older snapshot.
    StaleSnapshot {
        /// Error from the failed refresh.
        reason: String,
    },
    /// Filters excluded every record.
    EmptyResult,
    /// No valid delivery dates exist, so the date range filter is disabled.
    MissingDateRange,
    /// Some date cells could not be parsed and were treated as missing.
    UnparsedDates(usize),
    /// None of the default statuses exist in the data; status is unconstrained.
    DefaultStatusesUnavailable,
}

impl fmt::Display for ReportNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportNotice::StaleSnapshot { reason } => {
                write!(f, "refresh failed, showing previously loaded data: {reason}")
            }
            ReportNotice::EmptyResult => f.write_str("no records match the selected filters"),
            ReportNotice::MissingDateRange => {
                f.write_str("no valid delivery dates found; date range filter disabled")
            }
            ReportNotice::UnparsedDates(count) => {
                write!(f, "{count} date cell(s) could not be read and were left blank")
            }
            ReportNotice::DefaultStatusesUnavailable => {
                f.write_str("none of the default statuses are present; showing all statuses")
            }
        }
    }
}

/// What the user asked for.
#[derive(Clone, Debug, Default)]
pub struct ReportRequest {
    /// Explicit filter choices.
    pub selection: FilterSelection,
    /// Ordering keys; empty means `preset`.
    pub sort_keys: Vec<SortKey>,
    /// Ordering used when `sort_keys` is empty.
    pub preset: SortPreset,
    /// Statuses pre-selected when `selection.statuses` is empty.
    ///
    /// Intersected with the statuses present in the data. Leave empty to show
    /// every status by default.
    pub default_statuses: Vec<String>,
}

impl ReportRequest {
    /// Keys actually used for ordering.
    pub fn effective_sort_keys(&self) -> Vec<SortKey> {
        if self.sort_keys.is_empty() {
            self.preset.keys()
        } else {
            self.sort_keys.clone()
        }
    }
}

/// A classified, filtered, and ordered view of one snapshot.
#[derive(Clone, Debug)]
pub struct Report {
    /// Source the snapshot came from.
    pub source_id: SourceId,
    /// When the snapshot was loaded.
    pub fetched_at: DateTime<Utc>,
    /// Day the ages are measured against.
    pub reference_date: NaiveDate,
    /// Records in the snapshot before filtering.
    pub total_records: usize,
    /// Filter choices offered by the data.
    pub options: FilterOptions,
    /// Selection after defaults and date-range validation were applied.
    pub selection: FilterSelection,
    /// Ordering applied to `rows`.
    pub sort_keys: Vec<SortKey>,
    /// Filtered and ordered rows.
    pub rows: Vec<AgedRecord>,
    /// Warnings to show next to the table.
    pub notices: Vec<ReportNotice>,
}

impl Report {
    /// Record a notice, ignoring duplicates.
    pub fn push_notice(&mut self, notice: ReportNotice) {
        if !self.notices.contains(&notice) {
            self.notices.push(notice);
        }
    }

    /// Category tallies over the visible rows for `metric`.
    pub fn summary(&self, metric: AgingMetric) -> BTreeMap<Category, usize> {
        let table = match metric {
            AgingMetric::Delivery => &DELIVERY_AGING,
            AgingMetric::StatusChange => &STATUS_CHANGE_AGING,
        };
        category_counts(&self.rows, metric, table)
    }
}

/// Run the pipeline over `snapshot` with ages measured against `reference`.
pub fn build_report(
    snapshot: &SourceSnapshot,
    request: &ReportRequest,
    reference: NaiveDate,
) -> Report {
    let aged = derive_metrics(snapshot.records.iter().cloned(), reference);
    let options = FilterOptions::from_records(&snapshot.records);
    let mut notices = Vec::new();
    if snapshot.unparsed_dates > 0 {
        notices.push(ReportNotice::UnparsedDates(snapshot.unparsed_dates));
    }

    let mut selection = request.selection.clone();
    if selection.statuses.is_empty() && !request.default_statuses.is_empty() {
        selection.statuses = options.intersect(FilterField::Status, &request.default_statuses);
        if selection.statuses.is_empty() {
            notices.push(ReportNotice::DefaultStatusesUnavailable);
        }
    }
    if options.delivery_bounds.is_none() {
        notices.push(ReportNotice::MissingDateRange);
        selection.delivery_range = None;
    }

    let sort_keys = request.effective_sort_keys();
    let mut rows = apply(&aged, &selection);
    sort_records(&mut rows, &sort_keys);
    if rows.is_empty() {
        notices.push(ReportNotice::EmptyResult);
    }
    debug!(
        "[aging_report:report] source='{}' total={} visible={} reference={}",
        snapshot.source_id,
        aged.len(),
        rows.len(),
        reference
    );

    Report {
        source_id: snapshot.source_id.clone(),
        fetched_at: snapshot.fetched_at,
        reference_date: reference,
        total_records: aged.len(),
        options,
        selection,
        sort_keys,
        rows,
        notices,
    }
}

/// Build the report for one refresh cycle.
///
/// A failed refresh that still has a previous snapshot yields that snapshot's
/// report plus [`ReportNotice::StaleSnapshot`]. Without any snapshot the load
/// error is returned.
pub fn build_report_from_refresh(
    refresh: Refresh,
    request: &ReportRequest,
    reference: NaiveDate,
) -> Result<Report, ReportError> {
    match refresh {
        Refresh::Cached(snapshot) | Refresh::Loaded(snapshot) => {
            Ok(build_report(&snapshot, request, reference))
        }
        Refresh::Failed {
            error,
            previous: Some(previous),
        } => {
            warn!(
                "[aging_report:report] refresh failed, showing snapshot from {}: {error}",
                previous.fetched_at
            );
            let mut report = build_report(&previous, request, reference);
            report.push_notice(ReportNotice::StaleSnapshot {
                reason: error.to_string(),
            });
            Ok(report)
        }
        Refresh::Failed {
            error,
            previous: None,
        } => Err(error),
    }
}
