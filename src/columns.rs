//! Declarative column model shared by the terminal table, JSON output, and export.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::classify::{Category, DELIVERY_AGING, STATUS_CHANGE_AGING, classify};
use crate::constants::presentation::{DISPLAY_DATE_FORMAT, MISSING_CELL};
use crate::data::AgedRecord;
use crate::types::CellText;

/// Typed value extracted for one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnValue {
    /// Free text, shown as is.
    Text(String),
    /// Age in days; `None` renders as a dash.
    Days(Option<i64>),
    /// Calendar date shown day-first.
    Date(Option<NaiveDate>),
    /// Coloured bucket with its glyph.
    Category(Category),
}

impl ColumnValue {
    /// Text shown in the interactive table and written to the export.
    pub fn display(&self) -> CellText {
        match self {
            ColumnValue::Text(text) => text.clone(),
            ColumnValue::Days(Some(days)) => days.to_string(),
            ColumnValue::Date(Some(date)) => date.format(DISPLAY_DATE_FORMAT).to_string(),
            ColumnValue::Days(None) | ColumnValue::Date(None) => MISSING_CELL.to_string(),
            ColumnValue::Category(category) => category.glyph().to_string(),
        }
    }

    /// Machine-readable JSON value (ISO dates, category names, `null` for missing).
    pub fn to_json(&self) -> Value {
        match self {
            ColumnValue::Text(text) => Value::String(text.clone()),
            ColumnValue::Days(days) => days.map(Value::from).unwrap_or(Value::Null),
            ColumnValue::Date(date) => date
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            ColumnValue::Category(category) => {
                serde_json::to_value(category).unwrap_or(Value::Null)
            }
        }
    }
}

/// One output column: stable key, header label, and value extractor.
#[derive(Clone, Copy)]
pub struct Column {
    /// Stable machine key used for JSON output.
    pub key: &'static str,
    /// Header label.
    pub label: &'static str,
    /// Extracts the cell value from a record.
    pub value: fn(&AgedRecord) -> ColumnValue,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .finish()
    }
}

fn client(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Text(record.record.client.clone())
}

fn project(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Text(record.record.project.clone())
}

fn status(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Text(record.record.status.clone())
}

fn delivery_date(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Date(record.record.first_delivery_date)
}

fn delivery_days(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Days(record.days_since_first_delivery)
}

fn delivery_category(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Category(classify(record.days_since_first_delivery, &DELIVERY_AGING))
}

fn status_date(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Date(record.record.status_change_date)
}

fn status_days(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Days(record.days_since_status_change)
}

fn status_category(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Category(classify(record.days_since_status_change, &STATUS_CHANGE_AGING))
}

fn notes(record: &AgedRecord) -> ColumnValue {
    ColumnValue::Text(record.record.notes.clone())
}

/// Report columns in display order.
pub const REPORT_COLUMNS: &[Column] = &[
    Column { key: "client", label: "Client", value: client },
    Column { key: "project", label: "Project", value: project },
    Column { key: "status", label: "Status", value: status },
    Column { key: "first_delivery_date", label: "First Delivery", value: delivery_date },
    Column { key: "days_since_first_delivery", label: "Days", value: delivery_days },
    Column { key: "delivery_category", label: "ENT", value: delivery_category },
    Column { key: "status_change_date", label: "Status Change", value: status_date },
    Column { key: "days_since_status_change", label: "Days Alt.", value: status_days },
    Column { key: "status_change_category", label: "ALT", value: status_category },
    Column { key: "notes", label: "Notes", value: notes },
];

/// Render every record as display strings, one inner vec per row.
pub fn display_rows(records: &[AgedRecord], columns: &[Column]) -> Vec<Vec<CellText>> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| (column.value)(record).display())
                .collect()
        })
        .collect()
}

/// Render every record as a JSON object keyed by column key.
pub fn json_rows(records: &[AgedRecord], columns: &[Column]) -> Vec<Value> {
    records
        .iter()
        .map(|record| {
            let mut row = Map::new();
            for column in columns {
                row.insert(column.key.to_string(), (column.value)(record).to_json());
            }
            Value::Object(row)
        })
        .collect()
}
