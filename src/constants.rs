/// Constants describing the remote spreadsheet source.
pub mod source {
    /// CSV export of the shared PCP spreadsheet.
    pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/14i9CpKM87PRXvLAVo_0VUcjNxfxnCLwhhmg0mh5ywkI/gviz/tq?tqx=out:csv&gid=1319025913";
    /// Source id used for the default remote sheet.
    pub const DEFAULT_SOURCE_ID: &str = "pcp_sheet";
    /// Environment variable overriding the remote source URL.
    pub const SOURCE_URL_ENV: &str = "AGING_REPORT_SOURCE_URL";
    /// Environment variable overriding the snapshot cache TTL (seconds).
    pub const CACHE_TTL_ENV: &str = "AGING_REPORT_CACHE_TTL_SECS";
    /// Environment variable overriding the export directory.
    pub const EXPORT_DIR_ENV: &str = "AGING_REPORT_EXPORT_DIR";
    /// Default snapshot lifetime in seconds.
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
}

/// Canonical column headers and their accepted aliases.
///
/// Aliases are compared after header normalization (trimmed, collapsed
/// whitespace, uppercased, diacritics optionally stripped).
pub mod columns {
    /// Client column aliases.
    pub const CLIENT: &[&str] = &["CLIENTE", "CLIENT"];
    /// Owner (GP) column aliases.
    pub const OWNER: &[&str] = &["GP", "OWNER", "GP/OWNER"];
    /// Product column aliases.
    pub const PRODUCT: &[&str] = &["PRODUTO", "PRODUCT"];
    /// Project column aliases.
    pub const PROJECT: &[&str] = &["PROJETO", "PROJECT"];
    /// Status or phase column aliases.
    pub const STATUS: &[&str] = &["STATUS", "FASE", "PHASE"];
    /// First delivery date column aliases.
    pub const FIRST_DELIVERY_DATE: &[&str] = &[
        "DATA ENTREGA PRIMEIRA VALIDACAO",
        "DATA ENTREGA PRIMEIRA VALIDAÇÃO",
        "FIRST DELIVERY DATE",
    ];
    /// Status change date column aliases.
    pub const STATUS_CHANGE_DATE: &[&str] = &[
        "DATA ALTERACAO STATUS",
        "DATA ALTERAÇÃO STATUS",
        "STATUS CHANGE DATE",
    ];
    /// Free-text notes column aliases.
    pub const NOTES: &[&str] = &["OBSERVACOES", "OBSERVAÇÕES", "NOTES"];
}

/// Constants used by filtering defaults.
pub mod filters {
    /// Status values pre-selected when the user has not chosen any.
    pub const DEFAULT_STATUS_SELECTION: &[&str] = &["VC", "VC R1", "VC R2", "VC ADD"];
}

/// Constants used by presenters.
pub mod presentation {
    /// Day-first display format for date cells.
    pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
    /// Placeholder rendered for missing values.
    pub const MISSING_CELL: &str = "";
    /// Export file name prefix; the reference date is appended.
    pub const EXPORT_FILE_PREFIX: &str = "relatorio_pcp";
    /// Export worksheet name.
    pub const EXPORT_SHEET_NAME: &str = "Relatorio";
    /// Header fill colour for exported sheets.
    pub const EXPORT_HEADER_COLOR: u32 = 0x1F4E78;
    /// Upper bound applied to autofit column widths.
    pub const EXPORT_MAX_COLUMN_WIDTH: f64 = 60.0;
    /// Max display columns shown for notes in the terminal table.
    pub const TERMINAL_NOTES_WIDTH: usize = 48;
}
