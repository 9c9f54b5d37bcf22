//! Plain-text rendering of a report for terminal output.

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::classify::{Category, DELIVERY_AGING, STATUS_CHANGE_AGING, ThresholdTable};
use crate::columns::{Column, display_rows};
use crate::constants::presentation::{DISPLAY_DATE_FORMAT, TERMINAL_NOTES_WIDTH};
use crate::data::AgingMetric;
use crate::report::Report;
use crate::utils::truncate_to_width;

/// Render the legend for both aging tables plus the sentinel glyphs.
pub fn render_legend() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== legend ===");
    let tables = [
        ("Delivery (ENT)", &DELIVERY_AGING),
        ("Status change (ALT)", &STATUS_CHANGE_AGING),
    ];
    for (title, table) in tables {
        let _ = writeln!(out, "{title}: {}", legend_line(table));
    }
    let _ = writeln!(
        out,
        "General: {} {} | {} {}",
        Category::FutureDate.glyph(),
        Category::FutureDate.label(),
        Category::Missing.glyph(),
        Category::Missing.label()
    );
    out
}

fn legend_line(table: &ThresholdTable) -> String {
    table
        .legend()
        .iter()
        .map(|entry| format!("{} {}", entry.category.glyph(), entry.range))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Render the rows as an aligned text table using `columns`.
///
/// Cells are padded by display width, so two-column glyphs stay aligned. Notes
/// are truncated so long free text does not wrap the terminal.
pub fn render_table(report: &Report, columns: &[Column]) -> String {
    let headers: Vec<String> = columns.iter().map(|column| column.label.to_string()).collect();
    let rows: Vec<Vec<String>> = display_rows(&report.rows, columns)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(columns)
                .map(|(cell, column)| {
                    let single_line = cell.replace(['\n', '\r'], " ");
                    if column.key == "notes" {
                        truncate_to_width(&single_line, TERMINAL_NOTES_WIDTH)
                    } else {
                        single_line
                    }
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|header| header.width()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// Render the header block: source, reference day, counts, and active filters.
pub fn render_header(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== aging report ===");
    let _ = writeln!(out, "source       : {}", report.source_id);
    let _ = writeln!(
        out,
        "fetched at   : {}",
        report.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "reference    : {}",
        report.reference_date.format(DISPLAY_DATE_FORMAT)
    );
    let _ = writeln!(out, "rows         : {} of {}", report.rows.len(), report.total_records);
    for (label, values) in [
        ("clients", &report.selection.clients),
        ("owners", &report.selection.owners),
        ("products", &report.selection.products),
        ("statuses", &report.selection.statuses),
    ] {
        if !values.is_empty() {
            let joined = values.iter().cloned().collect::<Vec<_>>().join(", ");
            let _ = writeln!(out, "{label:<13}: {joined}");
        }
    }
    match (report.selection.delivery_range, report.options.delivery_bounds) {
        (Some(range), _) => {
            let _ = writeln!(
                out,
                "delivered    : {} to {}",
                range.start().format(DISPLAY_DATE_FORMAT),
                range.end().format(DISPLAY_DATE_FORMAT)
            );
        }
        (None, Some(bounds)) => {
            let _ = writeln!(
                out,
                "date range   : {} to {} (available)",
                bounds.start().format(DISPLAY_DATE_FORMAT),
                bounds.end().format(DISPLAY_DATE_FORMAT)
            );
        }
        (None, None) => {}
    }
    let order = report
        .sort_keys
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "order        : {order}");
    out
}

/// Render category tallies for both metrics.
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    let metrics = [
        ("ENT", AgingMetric::Delivery),
        ("ALT", AgingMetric::StatusChange),
    ];
    for (title, metric) in metrics {
        let parts = report
            .summary(metric)
            .into_iter()
            .map(|(category, count)| {
                format!("{} {}={}", category.glyph(), category.label(), count)
            })
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{title}: {parts}");
    }
    out
}

/// Render notices, one per line, or an empty string when there are none.
pub fn render_notices(report: &Report) -> String {
    let mut out = String::new();
    for notice in &report.notices {
        let _ = writeln!(out, "note: {notice}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::REPORT_COLUMNS;
    use crate::data::{Record, SourceSnapshot};
    use crate::report::{ReportRequest, build_report};
    use chrono::{NaiveDate, Utc};

    fn report() -> Report {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let snapshot = SourceSnapshot {
            source_id: "test".into(),
            records: vec![Record {
                client: "ACME".into(),
                project: "Rollout".into(),
                status: "VC".into(),
                first_delivery_date: NaiveDate::from_ymd_opt(2026, 2, 20),
                status_change_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                notes: "line one\nline two that keeps going well past the width limit of the table"
                    .into(),
                ..Record::default()
            }],
            unparsed_dates: 0,
            fetched_at: Utc::now(),
        };
        build_report(&snapshot, &ReportRequest::default(), today)
    }

    #[test]
    fn legend_lists_every_bucket() {
        let legend = render_legend();
        assert!(legend.contains("🟢 up to 21 days | 🟠 22 to 30 days | 🔴 over 30 days"));
        assert!(legend.contains("⚫ over 45 days"));
        assert!(legend.contains("📅 future date"));
    }

    #[test]
    fn table_has_header_rule_and_single_line_rows() {
        let table = render_table(&report(), REPORT_COLUMNS);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Client"));
        assert!(lines[1].starts_with("------"));
        assert!(lines[2].contains("20/02/2026"));
        assert!(lines[2].contains("🟢"));
        assert!(lines[2].contains("⚫"));
        assert!(lines[2].contains('…'));
    }

    fn separator_columns(line: &str) -> Vec<usize> {
        line.match_indices(" | ")
            .map(|(idx, _)| line[..idx].width())
            .collect()
    }

    #[test]
    fn separators_line_up_across_glyph_rows() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let snapshot = SourceSnapshot {
            source_id: "test".into(),
            records: vec![
                Record {
                    client: "A".into(),
                    first_delivery_date: NaiveDate::from_ymd_opt(2026, 2, 4),
                    status_change_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                    notes: "first".into(),
                    ..Record::default()
                },
                Record {
                    client: "B".into(),
                    notes: "second".into(),
                    ..Record::default()
                },
            ],
            unparsed_dates: 0,
            fetched_at: Utc::now(),
        };
        let report = build_report(&snapshot, &ReportRequest::default(), today);
        let table = render_table(&report, REPORT_COLUMNS);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("🟠"));
        assert!(lines[3].contains("⚪"));
        let expected = separator_columns(lines[0]);
        assert_eq!(expected.len(), REPORT_COLUMNS.len() - 1);
        for line in &lines[1..] {
            assert_eq!(separator_columns(line), expected, "misaligned row: {line}");
        }
    }

    #[test]
    fn header_and_summary_describe_the_view() {
        let report = report();
        let header = render_header(&report);
        assert!(header.contains("rows         : 1 of 1"));
        assert!(header.contains("order        : delivery-date:asc, status-date:asc"));
        let summary = render_summary(&report);
        assert!(summary.contains("🟢 on track=1"));
        assert!(summary.contains("⚫ critical=1"));
        assert!(render_notices(&report).is_empty());
    }
}
