use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde_json::json;
use tracing::warn;

use crate::columns::{REPORT_COLUMNS, json_rows};
use crate::config::ReportConfig;
use crate::export::export_to_dir;
use crate::filter::{DateRange, FilterField, FilterSelection};
use crate::ingestion::SnapshotCache;
use crate::render::{render_header, render_legend, render_notices, render_summary, render_table};
use crate::report::{Report, ReportRequest, build_report_from_refresh};
use crate::source::dates::{DateCell, parse_day_first};
use crate::source::{CsvFileSource, DataSource, HttpCsvSource};
use crate::sort::{SortKey, SortPreset};

type DynSource = Box<dyn DataSource + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Xlsx,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Chronological,
    MostOverdue,
}

impl From<PresetArg> for SortPreset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Chronological => SortPreset::Chronological,
            PresetArg::MostOverdue => SortPreset::MostOverdue,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "aging_report",
    disable_help_subcommand = true,
    about = "Aging report over the production control sheet",
    long_about = "Load the production control sheet, measure how long each project has waited since first delivery and since its last status change, then filter, classify, and order the result.",
    after_help = "The source URL, cache TTL, and export directory can also be set with AGING_REPORT_SOURCE_URL, AGING_REPORT_CACHE_TTL_SECS, and AGING_REPORT_EXPORT_DIR."
)]
/// CLI for `aging_report`.
///
/// Common usage:
/// - Default view (default statuses, chronological): `aging_report`
/// - Worst first for one client: `aging_report --client ACME --preset most-overdue`
/// - Delivered in a window: `aging_report --from 01/01/2026 --to 31/01/2026`
/// - Spreadsheet export: `aging_report --format xlsx --export-dir /tmp/reports`
struct ReportCli {
    #[arg(
        long = "client",
        value_name = "NAME",
        help = "Keep only these clients, repeat as needed"
    )]
    clients: Vec<String>,
    #[arg(
        long = "owner",
        value_name = "NAME",
        help = "Keep only these owners (GP), repeat as needed"
    )]
    owners: Vec<String>,
    #[arg(
        long = "product",
        value_name = "NAME",
        help = "Keep only these products, repeat as needed"
    )]
    products: Vec<String>,
    #[arg(
        long = "status",
        value_name = "STATUS",
        help = "Keep only these statuses, repeat as needed (overrides the default status selection)"
    )]
    statuses: Vec<String>,
    #[arg(
        long = "all-status",
        conflicts_with = "statuses",
        help = "Do not pre-select the default statuses"
    )]
    all_statuses: bool,
    #[arg(
        long,
        value_name = "DD/MM/YYYY",
        value_parser = parse_date_arg,
        requires = "to",
        help = "First delivery on or after this day"
    )]
    from: Option<NaiveDate>,
    #[arg(
        long,
        value_name = "DD/MM/YYYY",
        value_parser = parse_date_arg,
        requires = "from",
        help = "First delivery on or before this day"
    )]
    to: Option<NaiveDate>,
    #[arg(
        long = "sort",
        value_name = "FIELD[:asc|desc]",
        value_parser = parse_sort_key_arg,
        help = "Sort key, repeat for tie-breakers \
                (delivery-date, status-date, delivery-age, status-age)"
    )]
    sort_keys: Vec<SortKey>,
    #[arg(long, value_enum, help = "Named ordering used when no --sort is given")]
    preset: Option<PresetArg>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, help = "Output format")]
    format: OutputFormat,
    #[arg(
        long = "export-dir",
        value_name = "DIR",
        help = "Directory for --format xlsx output"
    )]
    export_dir: Option<PathBuf>,
    #[arg(
        long,
        value_name = "DD/MM/YYYY",
        value_parser = parse_date_arg,
        help = "Reference day for ages (defaults to the local date)"
    )]
    today: Option<NaiveDate>,
    #[arg(long = "source-url", value_name = "URL", help = "Remote CSV location")]
    source_url: Option<String>,
    #[arg(
        long = "source-file",
        value_name = "PATH",
        conflicts_with = "source_url",
        help = "Read the table from a local CSV file instead of the remote sheet"
    )]
    source_file: Option<PathBuf>,
}

/// Run the report CLI, writing to stdout.
pub fn run_report<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_report_with_output(args_iter, &mut out)
}

/// Run the report CLI, writing everything except logs to `out`.
pub fn run_report_with_output<I, W>(args_iter: I, out: &mut W) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
    W: Write,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let Some(cli) =
        parse_cli::<ReportCli, _>(std::iter::once("aging_report".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = ReportConfig::from_env()?;
    apply_cli_overrides(&cli, &mut config);

    let source: DynSource = match &cli.source_file {
        Some(path) => Box::new(
            CsvFileSource::new(path.clone()).with_strip_diacritics(config.loader.strip_diacritics),
        ),
        None => Box::new(HttpCsvSource::from_config(&config.loader)),
    };
    let cache = SnapshotCache::new(source, config.cache_ttl);

    let request = build_request(&cli, &config)?;
    let reference = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let report = build_report_from_refresh(cache.current(), &request, reference)
        .inspect_err(|error| warn!("[aging_report:app] no data available: {error}"))?;

    match cli.format {
        OutputFormat::Table => write_table(out, &report)?,
        OutputFormat::Json => write_json(out, &report)?,
        OutputFormat::Xlsx => {
            let path = export_to_dir(&report, REPORT_COLUMNS, &config.export_dir)?;
            write!(out, "{}", render_notices(&report))?;
            writeln!(
                out,
                "exported {} row(s) to {}",
                report.rows.len(),
                path.display()
            )?;
        }
    }
    Ok(())
}

fn apply_cli_overrides(cli: &ReportCli, config: &mut ReportConfig) {
    if let Some(url) = cli.source_url.clone() {
        config.loader.source_url = url;
    }
    if let Some(dir) = cli.export_dir.clone() {
        config.export_dir = dir;
    }
    if let Some(preset) = cli.preset {
        config.sort_preset = preset.into();
    }
    if cli.all_statuses {
        config.default_statuses.clear();
    }
}

fn build_request(cli: &ReportCli, config: &ReportConfig) -> Result<ReportRequest, Box<dyn Error>> {
    let mut selection = FilterSelection::unconstrained()
        .with_values(FilterField::Client, cli.clients.iter().cloned())
        .with_values(FilterField::Owner, cli.owners.iter().cloned())
        .with_values(FilterField::Product, cli.products.iter().cloned())
        .with_values(FilterField::Status, cli.statuses.iter().cloned());
    if let (Some(from), Some(to)) = (cli.from, cli.to) {
        selection = selection.with_delivery_range(DateRange::new(from, to)?);
    }
    Ok(ReportRequest {
        selection,
        sort_keys: cli.sort_keys.clone(),
        preset: config.sort_preset,
        default_statuses: config.default_statuses.clone(),
    })
}

fn write_table<W: Write>(out: &mut W, report: &Report) -> std::io::Result<()> {
    writeln!(out, "{}", render_header(report))?;
    writeln!(out, "{}", render_legend())?;
    if !report.rows.is_empty() {
        writeln!(out, "{}", render_table(report, REPORT_COLUMNS))?;
        write!(out, "{}", render_summary(report))?;
    }
    write!(out, "{}", render_notices(report))
}

fn write_json<W: Write>(out: &mut W, report: &Report) -> Result<(), Box<dyn Error>> {
    let payload = json!({
        "source_id": report.source_id,
        "fetched_at": report.fetched_at.to_rfc3339(),
        "reference_date": report.reference_date.format("%Y-%m-%d").to_string(),
        "total_records": report.total_records,
        "visible_records": report.rows.len(),
        "sort": report.sort_keys.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "notices": report.notices.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "rows": json_rows(&report.rows, REPORT_COLUMNS),
    });
    serde_json::to_writer_pretty(&mut *out, &payload)?;
    writeln!(out)?;
    Ok(())
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    match parse_day_first(raw) {
        DateCell::Date(date) => Ok(date),
        DateCell::Blank => Err("date must not be empty".to_string()),
        DateCell::Invalid => Err(format!(
            "Could not parse '{}' as a day-first date (DD/MM/YYYY)",
            raw.trim()
        )),
    }
}

fn parse_sort_key_arg(raw: &str) -> Result<SortKey, String> {
    raw.parse::<SortKey>().map_err(|err| err.to_string())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<ReportCli>, Box<dyn Error>> {
        parse_cli::<ReportCli, _>(std::iter::once("aging_report").chain(args.iter().copied()))
    }

    #[test]
    fn parses_repeatable_filters_and_sort_keys() {
        let cli = parse(&[
            "--client",
            "ACME",
            "--client",
            "Globex",
            "--sort",
            "delivery-age:desc",
            "--sort",
            "status-date",
            "--from",
            "01/01/2026",
            "--to",
            "31/01/2026",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(cli.clients, vec!["ACME", "Globex"]);
        assert_eq!(cli.sort_keys.len(), 2);
        assert_eq!(cli.from, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(cli.to, NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn rejects_half_open_ranges_and_bad_dates() {
        assert!(parse(&["--from", "01/01/2026"]).is_err());
        assert!(parse(&["--from", "2026-13-45", "--to", "01/02/2026"]).is_err());
        assert!(parse(&["--sort", "priority"]).is_err());
        assert!(parse(&["--status", "VC", "--all-status"]).is_err());
    }

    #[test]
    fn help_is_not_an_error() {
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn reversed_range_is_a_configuration_error() {
        let cli = parse(&["--from", "31/01/2026", "--to", "01/01/2026"])
            .unwrap()
            .unwrap();
        assert!(build_request(&cli, &ReportConfig::default()).is_err());
    }

    #[test]
    fn all_status_clears_default_statuses() {
        let cli = parse(&["--all-status", "--preset", "most-overdue"])
            .unwrap()
            .unwrap();
        let mut config = ReportConfig::default();
        apply_cli_overrides(&cli, &mut config);
        let request = build_request(&cli, &config).unwrap();
        assert!(request.default_statuses.is_empty());
        assert_eq!(request.effective_sort_keys(), SortPreset::MostOverdue.keys());
    }
}
