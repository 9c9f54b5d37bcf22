//! Composite, stable ordering of aged records.
//!
//! Missing values sort after every present value for each key, in both
//! directions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::Datelike;

use crate::data::AgedRecord;
use crate::errors::ReportError;

/// Column a sort key reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortField {
    /// First delivery date.
    FirstDeliveryDate,
    /// Last status change date.
    StatusChangeDate,
    /// Days since first delivery.
    DeliveryAge,
    /// Days since last status change.
    StatusChangeAge,
}

impl SortField {
    fn value(self, record: &AgedRecord) -> Option<i64> {
        match self {
            SortField::FirstDeliveryDate => record
                .record
                .first_delivery_date
                .map(|date| i64::from(date.num_days_from_ce())),
            SortField::StatusChangeDate => record
                .record
                .status_change_date
                .map(|date| i64::from(date.num_days_from_ce())),
            SortField::DeliveryAge => record.days_since_first_delivery,
            SortField::StatusChangeAge => record.days_since_status_change,
        }
    }

    fn name(self) -> &'static str {
        match self {
            SortField::FirstDeliveryDate => "delivery-date",
            SortField::StatusChangeDate => "status-date",
            SortField::DeliveryAge => "delivery-age",
            SortField::StatusChangeAge => "status-age",
        }
    }
}

/// Order of one sort key. Missing values go last either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// One `(field, direction)` pair of a composite ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Column compared.
    pub field: SortField,
    /// Comparison order.
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending key on `field`.
    pub const fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Descending key on `field`.
    pub const fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    fn compare(&self, left: &AgedRecord, right: &AgedRecord) -> Ordering {
        match (self.field.value(left), self.field.value(right)) {
            (Some(a), Some(b)) => match self.direction {
                SortDirection::Ascending => a.cmp(&b),
                SortDirection::Descending => b.cmp(&a),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", self.field.name(), direction)
    }
}

impl FromStr for SortKey {
    type Err = ReportError;

    /// Parse `field[:asc|desc]`, for example `delivery-age:desc`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (field_raw, direction_raw) = raw.split_once(':').unwrap_or((raw, "asc"));
        let field = match field_raw.trim().to_ascii_lowercase().as_str() {
            "delivery-date" | "delivery_date" => SortField::FirstDeliveryDate,
            "status-date" | "status_date" => SortField::StatusChangeDate,
            "delivery-age" | "delivery_age" => SortField::DeliveryAge,
            "status-age" | "status_age" => SortField::StatusChangeAge,
            other => {
                return Err(ReportError::Configuration(format!(
                    "unknown sort field '{other}' \
                     (expected delivery-date, status-date, delivery-age, or status-age)"
                )));
            }
        };
        let direction = match direction_raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Ascending,
            "desc" | "descending" => SortDirection::Descending,
            other => {
                return Err(ReportError::Configuration(format!(
                    "unknown sort direction '{other}' (expected asc or desc)"
                )));
            }
        };
        Ok(Self { field, direction })
    }
}

/// Named orderings offered by the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortPreset {
    /// Oldest first delivery first, then oldest status change.
    #[default]
    Chronological,
    /// Largest delivery age first, then largest status-change age.
    MostOverdue,
}

impl SortPreset {
    /// Composite keys this preset stands for.
    pub fn keys(self) -> Vec<SortKey> {
        match self {
            SortPreset::Chronological => vec![
                SortKey::ascending(SortField::FirstDeliveryDate),
                SortKey::ascending(SortField::StatusChangeDate),
            ],
            SortPreset::MostOverdue => vec![
                SortKey::descending(SortField::DeliveryAge),
                SortKey::descending(SortField::StatusChangeAge),
            ],
        }
    }
}

/// Stable sort by `keys` in priority order. Ties across all keys keep input order.
pub fn sort_records(records: &mut [AgedRecord], keys: &[SortKey]) {
    records.sort_by(|left, right| {
        keys.iter()
            .map(|key| key.compare(left, right))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// Sorted copy of `records`.
pub fn sorted(records: &[AgedRecord], keys: &[SortKey]) -> Vec<AgedRecord> {
    let mut out = records.to_vec();
    sort_records(&mut out, keys);
    out
}
