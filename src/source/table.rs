//! CSV table parsing: header normalization, column resolution, and record building.

use csv::{ReaderBuilder, StringRecord};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::constants::columns;
use crate::data::Record;
use crate::errors::ReportError;
use crate::source::dates::{DateCell, parse_day_first};
use crate::types::ColumnName;
use crate::utils::{normalize_header, normalize_inline_whitespace};

/// Records parsed from one CSV payload.
#[derive(Clone, Debug, Default)]
pub struct ParsedTable {
    /// Records in source order.
    pub records: Vec<Record>,
    /// Non-blank date cells that could not be parsed.
    pub unparsed_dates: usize,
    /// Rows the CSV reader could not decode.
    pub skipped_rows: usize,
}

/// Resolved column positions for the fields the pipeline reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    client: usize,
    status: usize,
    owner: Option<usize>,
    product: Option<usize>,
    project: Option<usize>,
    first_delivery_date: Option<usize>,
    status_change_date: Option<usize>,
    notes: Option<usize>,
}

impl ColumnLayout {
    /// Resolve column positions from raw CSV headers.
    ///
    /// Client and status columns are required; every other column degrades to
    /// empty values when absent.
    pub fn resolve(
        source_id: &str,
        headers: &StringRecord,
        strip_marks: bool,
    ) -> Result<Self, ReportError> {
        let mut index: IndexMap<ColumnName, usize> = IndexMap::new();
        for (position, raw) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers.
            index
                .entry(normalize_header(raw, strip_marks))
                .or_insert(position);
        }
        let find = |aliases: &[&str]| {
            aliases.iter().find_map(|alias| {
                let alias = normalize_header(alias, strip_marks);
                index.get(&alias).copied()
            })
        };
        let require = |aliases: &[&str]| {
            find(aliases).ok_or_else(|| ReportError::SourceInconsistent {
                source_id: source_id.to_string(),
                details: format!(
                    "missing required column (expected one of {}); found [{}]",
                    aliases.join(", "),
                    index.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            })
        };

        let layout = Self {
            client: require(columns::CLIENT)?,
            status: require(columns::STATUS)?,
            owner: find(columns::OWNER),
            product: find(columns::PRODUCT),
            project: find(columns::PROJECT),
            first_delivery_date: find(columns::FIRST_DELIVERY_DATE),
            status_change_date: find(columns::STATUS_CHANGE_DATE),
            notes: find(columns::NOTES),
        };
        for (label, position) in [
            ("owner", layout.owner),
            ("product", layout.product),
            ("project", layout.project),
            ("first delivery date", layout.first_delivery_date),
            ("status change date", layout.status_change_date),
            ("notes", layout.notes),
        ] {
            if position.is_none() {
                warn!(
                    "[aging_report:source] '{source_id}' has no {label} column; values left empty"
                );
            }
        }
        Ok(layout)
    }
}

/// Parse a CSV payload into records.
///
/// Date cells that fail to parse become `None` and are counted; rows the CSV
/// reader cannot decode are skipped and counted; fully blank rows are dropped.
pub fn parse_table(
    source_id: &str,
    payload: &str,
    strip_marks: bool,
) -> Result<ParsedTable, ReportError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(payload.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| ReportError::SourceInconsistent {
            source_id: source_id.to_string(),
            details: format!("failed reading CSV header row: {err}"),
        })?
        .clone();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(ReportError::SourceInconsistent {
            source_id: source_id.to_string(),
            details: "CSV payload has no header row".into(),
        });
    }
    let layout = ColumnLayout::resolve(source_id, &headers, strip_marks)?;

    let mut table = ParsedTable::default();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                let line = error_line(&err)
                    .map_or_else(|| "?".to_string(), |line| line.to_string());
                warn!("[aging_report:source] '{source_id}' skipping row at line {line}: {err}");
                table.skipped_rows += 1;
                continue;
            }
        };
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let (record, unparsed) = build_record(&layout, &row);
        table.unparsed_dates += unparsed;
        table.records.push(record);
    }
    debug!(
        "[aging_report:source] '{source_id}' parsed rows={} unparsed_dates={} skipped_rows={}",
        table.records.len(),
        table.unparsed_dates,
        table.skipped_rows
    );
    Ok(table)
}

/// One-based CSV line an error points at, when the reader knows it.
fn error_line(err: &csv::Error) -> Option<u64> {
    err.position().map(|position| position.line())
}

fn build_record(layout: &ColumnLayout, row: &StringRecord) -> (Record, usize) {
    let text = |position: Option<usize>| {
        position
            .and_then(|idx| row.get(idx))
            .map(normalize_inline_whitespace)
            .unwrap_or_default()
    };
    let mut unparsed = 0usize;
    let mut date = |position: Option<usize>| {
        let cell = position
            .and_then(|idx| row.get(idx))
            .map(parse_day_first)
            .unwrap_or(DateCell::Blank);
        if cell == DateCell::Invalid {
            unparsed += 1;
        }
        cell.into_option()
    };
    let first_delivery_date = date(layout.first_delivery_date);
    let status_change_date = date(layout.status_change_date);
    let record = Record {
        client: text(Some(layout.client)),
        owner: text(layout.owner),
        product: text(layout.product),
        project: text(layout.project),
        status: text(Some(layout.status)),
        first_delivery_date,
        status_change_date,
        notes: layout
            .notes
            .and_then(|idx| row.get(idx))
            .map(|notes| notes.trim().to_string())
            .unwrap_or_default(),
    };
    (record, unparsed)
}
