//! XLSX export of a report.
//!
//! Category cells are filled with the colour of their bucket, read from the same
//! threshold tables the terminal table uses. Column widths follow the longest
//! cell, capped so free-text notes stay readable.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::classify::Category;
use crate::columns::{Column, ColumnValue};
use crate::constants::presentation::{
    EXPORT_FILE_PREFIX, EXPORT_HEADER_COLOR, EXPORT_MAX_COLUMN_WIDTH, EXPORT_SHEET_NAME,
};
use crate::errors::ReportError;
use crate::report::Report;

/// File name for an export produced on `reference`, e.g. `relatorio_pcp_2026-03-01.xlsx`.
pub fn export_file_name(reference: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}_{}.xlsx", reference.format("%Y-%m-%d"))
}

fn xlsx_error(err: XlsxError) -> ReportError {
    ReportError::Export(err.to_string())
}

fn category_format(category: Category) -> Format {
    Format::new()
        .set_background_color(category.fill_color())
        .set_font_color(category.font_color())
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
}

fn write_sheet(
    sheet: &mut Worksheet,
    report: &Report,
    columns: &[Column],
) -> Result<(), XlsxError> {
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(EXPORT_HEADER_COLOR)
        .set_font_color(0xFFFFFF)
        .set_border(FormatBorder::Thin);
    let text = Format::new().set_border(FormatBorder::Thin);
    let number = Format::new()
        .set_num_format("0")
        .set_align(FormatAlign::Right)
        .set_border(FormatBorder::Thin);

    sheet.set_name(EXPORT_SHEET_NAME)?;
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|column| column.label.chars().count())
        .collect();
    for (col, column) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, column.label, &header)?;
    }
    for (idx, record) in report.rows.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            let value = (column.value)(record);
            let text_width = value.display().chars().count();
            if let Some(width) = widths.get_mut(col as usize) {
                *width = (*width).max(text_width);
            }
            match &value {
                ColumnValue::Days(Some(days)) => {
                    sheet.write_number_with_format(row, col, *days as f64, &number)?;
                }
                ColumnValue::Category(category) => {
                    sheet.write_string_with_format(
                        row,
                        col,
                        value.display(),
                        &category_format(*category),
                    )?;
                }
                _ => {
                    sheet.write_string_with_format(row, col, value.display(), &text)?;
                }
            }
        }
    }
    sheet.set_freeze_panes(1, 0)?;
    for (col, width) in widths.into_iter().enumerate() {
        let width = (width as f64 + 2.0).min(EXPORT_MAX_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width)?;
    }
    Ok(())
}

/// Build the workbook for `report` in memory.
pub fn build_workbook(report: &Report, columns: &[Column]) -> Result<Workbook, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_sheet(sheet, report, columns).map_err(xlsx_error)?;
    Ok(workbook)
}

/// Serialize the export to XLSX bytes.
pub fn export_to_buffer(report: &Report, columns: &[Column]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = build_workbook(report, columns)?;
    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Write the export into `dir` under the date-stamped file name and return its path.
pub fn export_to_dir(
    report: &Report,
    columns: &[Column],
    dir: &Path,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(report.reference_date));
    let bytes = export_to_buffer(report, columns)?;
    fs::write(&path, &bytes)?;
    info!(
        "[aging_report:export] wrote {} rows to {}",
        report.rows.len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::REPORT_COLUMNS;
    use crate::data::{Record, SourceSnapshot};
    use crate::report::{ReportRequest, build_report};
    use chrono::Utc;
    use std::io::{Cursor, Read};
    use tempfile::tempdir;

    fn report() -> Report {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let snapshot = SourceSnapshot {
            source_id: "test".into(),
            records: vec![
                Record {
                    client: "ACME".into(),
                    first_delivery_date: NaiveDate::from_ymd_opt(2026, 1, 2),
                    ..Record::default()
                },
                Record {
                    client: "Globex".into(),
                    ..Record::default()
                },
            ],
            unparsed_dates: 0,
            fetched_at: Utc::now(),
        };
        build_report(&snapshot, &ReportRequest::default(), today)
    }

    #[test]
    fn file_name_is_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(export_file_name(date), "relatorio_pcp_2026-03-01.xlsx");
    }

    #[test]
    fn buffer_is_a_zip_container() {
        let bytes = export_to_buffer(&report(), REPORT_COLUMNS).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn export_to_dir_writes_named_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("exports");
        let path = export_to_dir(&report(), REPORT_COLUMNS, &target).unwrap();
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("relatorio_pcp_2026-03-01.xlsx")
        );
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    fn styles_xml(bytes: Vec<u8>) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut styles = String::new();
        archive
            .by_name("xl/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();
        styles
    }

    #[test]
    fn category_cells_use_the_category_palette() {
        let expected = Format::new()
            .set_background_color(0xF4B183)
            .set_font_color(0x000000)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);
        assert_eq!(category_format(Category::Warning), expected);
        assert_ne!(category_format(Category::Late), expected);
    }

    #[test]
    fn exported_styles_hold_every_written_category_fill() {
        let report = report();
        let bytes = export_to_buffer(&report, REPORT_COLUMNS).unwrap();
        let styles = styles_xml(bytes);
        // ACME: 58 days since delivery (late), no status date; Globex: both missing.
        for category in [Category::Late, Category::Missing] {
            let argb = format!("FF{:06X}", category.fill_color());
            assert!(styles.contains(&argb), "missing fill {argb} for {category:?}");
        }
        assert!(styles.contains(&format!("FF{EXPORT_HEADER_COLOR:06X}")));
        assert!(!styles.contains(&format!("FF{:06X}", Category::Warning.fill_color())));
    }

    #[test]
    fn empty_report_still_exports_headers() {
        let mut empty = report();
        empty.rows.clear();
        assert!(export_to_buffer(&empty, REPORT_COLUMNS).is_ok());
    }
}
