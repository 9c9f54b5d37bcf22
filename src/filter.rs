//! Filter engine: conjunctive set-membership and date-range predicates.
//!
//! Every active dimension becomes an independent [`Predicate`]; a record passes
//! when all predicates match, so the order predicates run in never changes the
//! surviving set. An empty selection is a no-op.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::{AgedRecord, Record};
use crate::errors::ReportError;
use crate::types::FieldValue;
use crate::utils::normalize_inline_whitespace;

/// Categorical dimension a user can filter on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterField {
    /// [`Record::client`](crate::data::Record::client).
    Client,
    /// [`Record::owner`](crate::data::Record::owner).
    Owner,
    /// [`Record::product`](crate::data::Record::product).
    Product,
    /// [`Record::status`](crate::data::Record::status).
    Status,
}

impl FilterField {
    /// All categorical dimensions, in display order.
    pub const ALL: [FilterField; 4] = [
        FilterField::Client,
        FilterField::Owner,
        FilterField::Product,
        FilterField::Status,
    ];

    /// Field value on `record`, trimmed.
    pub fn value(self, record: &Record) -> &str {
        let raw = match self {
            FilterField::Client => &record.client,
            FilterField::Owner => &record.owner,
            FilterField::Product => &record.product,
            FilterField::Status => &record.status,
        };
        raw.trim()
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterField::Client => "client",
            FilterField::Owner => "owner",
            FilterField::Product => "product",
            FilterField::Status => "status",
        };
        f.write_str(name)
    }
}

/// Inclusive calendar interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build `[start, end]`; rejects reversed bounds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::Configuration(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// First day of the interval.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the interval, inclusive.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `true` when `date` is present and inside the interval.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|date| self.start <= date && date <= self.end)
    }
}

/// User filter choices. Empty sets and a `None` range impose no constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Allowed clients.
    pub clients: BTreeSet<FieldValue>,
    /// Allowed owners.
    pub owners: BTreeSet<FieldValue>,
    /// Allowed products.
    pub products: BTreeSet<FieldValue>,
    /// Allowed statuses.
    pub statuses: BTreeSet<FieldValue>,
    /// Inclusive range over the first delivery date.
    pub delivery_range: Option<DateRange>,
}

impl FilterSelection {
    /// Selection with no constraints.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Allowed values for `field`.
    pub fn values(&self, field: FilterField) -> &BTreeSet<FieldValue> {
        match field {
            FilterField::Client => &self.clients,
            FilterField::Owner => &self.owners,
            FilterField::Product => &self.products,
            FilterField::Status => &self.statuses,
        }
    }

    fn values_mut(&mut self, field: FilterField) -> &mut BTreeSet<FieldValue> {
        match field {
            FilterField::Client => &mut self.clients,
            FilterField::Owner => &mut self.owners,
            FilterField::Product => &mut self.products,
            FilterField::Status => &mut self.statuses,
        }
    }

    /// Add allowed values for `field`.
    ///
    /// Values are normalized like loaded cells (trimmed, inner whitespace
    /// collapsed) and blanks are ignored.
    pub fn with_values<I, V>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let target = self.values_mut(field);
        target.extend(
            values
                .into_iter()
                .map(|value| normalize_inline_whitespace(value.as_ref()))
                .filter(|value| !value.is_empty()),
        );
        self
    }

    /// Restrict first delivery dates to `range`.
    pub fn with_delivery_range(mut self, range: DateRange) -> Self {
        self.delivery_range = Some(range);
        self
    }

    /// `true` when no dimension is constrained.
    pub fn is_unconstrained(&self) -> bool {
        FilterField::ALL
            .iter()
            .all(|field| self.values(*field).is_empty())
            && self.delivery_range.is_none()
    }

    /// One predicate per active dimension.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates: Vec<Predicate> = FilterField::ALL
            .iter()
            .filter(|field| !self.values(**field).is_empty())
            .map(|field| Predicate::Membership {
                field: *field,
                allowed: self.values(*field).clone(),
            })
            .collect();
        if let Some(range) = self.delivery_range {
            predicates.push(Predicate::DeliveryWithin(range));
        }
        predicates
    }
}

/// A single filter dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// Keep records whose trimmed field value is in `allowed`.
    Membership {
        /// Column being tested.
        field: FilterField,
        /// Accepted values.
        allowed: BTreeSet<FieldValue>,
    },
    /// Keep records with a non-missing first delivery date inside the range.
    DeliveryWithin(DateRange),
}

impl Predicate {
    /// `true` when `record` passes this predicate.
    pub fn matches(&self, record: &AgedRecord) -> bool {
        match self {
            Predicate::Membership { field, allowed } => {
                allowed.contains(field.value(&record.record))
            }
            Predicate::DeliveryWithin(range) => range.contains(record.record.first_delivery_date),
        }
    }
}

/// Keep records that satisfy every predicate in `predicates`.
pub fn apply_predicates(records: &[AgedRecord], predicates: &[Predicate]) -> Vec<AgedRecord> {
    records
        .iter()
        .filter(|record| predicates.iter().all(|predicate| predicate.matches(record)))
        .cloned()
        .collect()
}

/// Keep records that satisfy `selection`. Source order is preserved.
pub fn apply(records: &[AgedRecord], selection: &FilterSelection) -> Vec<AgedRecord> {
    apply_predicates(records, &selection.predicates())
}

/// Choices offered to the user, derived from the loaded data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Distinct clients, sorted.
    pub clients: Vec<FieldValue>,
    /// Distinct owners, sorted.
    pub owners: Vec<FieldValue>,
    /// Distinct products, sorted.
    pub products: Vec<FieldValue>,
    /// Distinct statuses, sorted.
    pub statuses: Vec<FieldValue>,
    /// Min/max first delivery date; `None` when no record has a valid date.
    pub delivery_bounds: Option<DateRange>,
}

impl FilterOptions {
    /// Sorted distinct non-blank values per dimension plus the delivery date bounds.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut sets: [BTreeSet<FieldValue>; 4] = Default::default();
        let mut min: Option<NaiveDate> = None;
        let mut max: Option<NaiveDate> = None;
        for record in records {
            for (set, field) in sets.iter_mut().zip(FilterField::ALL) {
                let value = field.value(record);
                if !value.is_empty() {
                    set.insert(value.to_string());
                }
            }
            if let Some(date) = record.first_delivery_date {
                min = Some(min.map_or(date, |current| current.min(date)));
                max = Some(max.map_or(date, |current| current.max(date)));
            }
        }
        let [clients, owners, products, statuses] =
            sets.map(|set| set.into_iter().collect::<Vec<FieldValue>>());
        let delivery_bounds = match (min, max) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };
        Self {
            clients,
            owners,
            products,
            statuses,
            delivery_bounds,
        }
    }

    /// Options for `field`.
    pub fn values(&self, field: FilterField) -> &[FieldValue] {
        match field {
            FilterField::Client => &self.clients,
            FilterField::Owner => &self.owners,
            FilterField::Product => &self.products,
            FilterField::Status => &self.statuses,
        }
    }

    /// Keep only the `desired` values that exist among the options for `field`.
    ///
    /// Preset selections pass through this so a stale default never filters
    /// everything out.
    pub fn intersect(&self, field: FilterField, desired: &[String]) -> BTreeSet<FieldValue> {
        let available = self.values(field);
        desired
            .iter()
            .map(normalize_inline_whitespace)
            .filter(|value| available.iter().any(|option| option == value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive_metrics;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(client: &str, owner: &str, status: &str, delivered: Option<NaiveDate>) -> Record {
        Record {
            client: client.into(),
            owner: owner.into(),
            product: "ERP".into(),
            status: status.into(),
            first_delivery_date: delivered,
            ..Record::default()
        }
    }

    fn fixture() -> Vec<AgedRecord> {
        derive_metrics(
            vec![
                record("ACME", "Ana", "VC", Some(day(2026, 1, 10))),
                record(" Globex ", "Bruno", "VC R1", Some(day(2026, 2, 1))),
                record("ACME", "Bruno", "DONE", None),
                record("Initech", "Ana", "VC", Some(day(2026, 2, 28))),
            ],
            day(2026, 3, 1),
        )
    }

    fn clients(records: &[AgedRecord]) -> Vec<&str> {
        records.iter().map(|r| r.record.client.trim()).collect()
    }

    #[test]
    fn empty_selection_is_identity() {
        let records = fixture();
        assert!(FilterSelection::unconstrained().is_unconstrained());
        assert_eq!(apply(&records, &FilterSelection::unconstrained()), records);
        assert!(apply(&[], &FilterSelection::unconstrained()).is_empty());
    }

    #[test]
    fn membership_matches_trimmed_values() {
        let records = fixture();
        let selection = FilterSelection::default().with_values(FilterField::Client, ["Globex "]);
        assert_eq!(clients(&apply(&records, &selection)), vec!["Globex"]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let records = fixture();
        let selection = FilterSelection::default()
            .with_values(FilterField::Owner, ["Ana"])
            .with_values(FilterField::Status, ["VC"])
            .with_values(FilterField::Client, ["ACME", "Initech"]);
        assert_eq!(clients(&apply(&records, &selection)), vec!["ACME", "Initech"]);

        let none = selection.with_values(FilterField::Product, ["CRM"]);
        assert!(apply(&records, &none).is_empty());
    }

    #[test]
    fn date_range_is_inclusive_and_drops_missing_dates() {
        let records = fixture();
        let range = DateRange::new(day(2026, 2, 1), day(2026, 2, 28)).unwrap();
        let selection = FilterSelection::default().with_delivery_range(range);
        assert_eq!(clients(&apply(&records, &selection)), vec!["Globex", "Initech"]);
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        assert!(DateRange::new(day(2026, 3, 1), day(2026, 2, 1)).is_err());
        let single = DateRange::new(day(2026, 3, 1), day(2026, 3, 1)).unwrap();
        assert!(single.contains(Some(day(2026, 3, 1))));
        assert!(!single.contains(None));
    }

    #[test]
    fn predicate_order_does_not_change_the_result() {
        let records = fixture();
        let selection = FilterSelection::default()
            .with_values(FilterField::Owner, ["Ana", "Bruno"])
            .with_values(FilterField::Status, ["VC", "VC R1"])
            .with_delivery_range(DateRange::new(day(2026, 1, 1), day(2026, 2, 15)).unwrap());
        let predicates = selection.predicates();
        assert_eq!(predicates.len(), 3);
        let expected = apply_predicates(&records, &predicates);
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let permuted: Vec<Predicate> =
                order.iter().map(|idx| predicates[*idx].clone()).collect();
            // Apply one predicate at a time to mimic sequential filtering.
            let mut staged = records.clone();
            for predicate in &permuted {
                staged = apply_predicates(&staged, std::slice::from_ref(predicate));
            }
            assert_eq!(staged, expected, "order {order:?}");
        }
        assert_eq!(clients(&expected), vec!["ACME", "Globex"]);
    }

    #[test]
    fn options_are_sorted_distinct_and_bounded() {
        let records = fixture();
        let options = FilterOptions::from_records(records.iter().map(|r| &r.record));
        assert_eq!(options.clients, vec!["ACME", "Globex", "Initech"]);
        assert_eq!(options.statuses, vec!["DONE", "VC", "VC R1"]);
        let bounds = options.delivery_bounds.unwrap();
        assert_eq!(bounds.start(), day(2026, 1, 10));
        assert_eq!(bounds.end(), day(2026, 2, 28));
    }

    #[test]
    fn options_without_dates_have_no_bounds() {
        let options = FilterOptions::from_records(&[record("A", "", "VC", None)]);
        assert_eq!(options.delivery_bounds, None);
        assert!(options.owners.is_empty());
    }

    #[test]
    fn intersect_keeps_only_present_defaults() {
        let records = fixture();
        let options = FilterOptions::from_records(records.iter().map(|r| &r.record));
        let desired: Vec<String> = ["VC", "VC R1", "VC R2", "VC ADD"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let kept = options.intersect(FilterField::Status, &desired);
        assert_eq!(kept.into_iter().collect::<Vec<_>>(), vec!["VC", "VC R1"]);
    }

    #[test]
    fn selections_collapse_inner_whitespace_like_loaded_cells() {
        let records = fixture();
        let selection =
            FilterSelection::default().with_values(FilterField::Status, ["  VC   R1 ", "\tVC\n"]);
        let statuses: Vec<&str> = selection.statuses.iter().map(String::as_str).collect();
        assert_eq!(statuses, vec!["VC", "VC R1"]);
        let kept = apply(&records, &selection);
        assert!(kept.iter().all(|r| r.record.status == "VC" || r.record.status == "VC R1"));
        assert!(kept.iter().any(|r| r.record.status == "VC R1"));

        let options = FilterOptions::from_records(records.iter().map(|r| &r.record));
        let desired = vec!["VC  R1".to_string(), " VC ADD".to_string()];
        let intersected = options.intersect(FilterField::Status, &desired);
        assert_eq!(intersected.into_iter().collect::<Vec<_>>(), vec!["VC R1"]);
    }
}
