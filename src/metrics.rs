use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::classify::{Category, ThresholdTable, classify};
use crate::data::{AgedRecord, AgingMetric, Record};

/// Whole calendar days from `date` to `reference`; negative when `date` is in the future.
pub fn days_since(date: Option<NaiveDate>, reference: NaiveDate) -> Option<i64> {
    date.map(|date| (reference - date).num_days())
}

/// Attach aging metrics to every record, relative to `reference` (a calendar day).
///
/// Missing dates propagate to missing ages; nothing here can fail.
pub fn derive_metrics<I>(records: I, reference: NaiveDate) -> Vec<AgedRecord>
where
    I: IntoIterator<Item = Record>,
{
    records
        .into_iter()
        .map(|record| AgedRecord {
            days_since_first_delivery: days_since(record.first_delivery_date, reference),
            days_since_status_change: days_since(record.status_change_date, reference),
            record,
        })
        .collect()
}

/// Count records per category for one metric, in category order.
pub fn category_counts(
    records: &[AgedRecord],
    metric: AgingMetric,
    table: &ThresholdTable,
) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts
            .entry(classify(record.age(metric), table))
            .or_insert(0) += 1;
    }
    counts
}
