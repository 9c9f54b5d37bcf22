/// Identifier for the source that produced a snapshot.
/// Examples: `pcp_sheet`, `file:/tmp/export.csv`
pub type SourceId = String;
/// Normalized column header.
/// Examples: `CLIENTE`, `DATA ALTERACAO STATUS`
pub type ColumnName = String;
/// Trimmed categorical cell value used for filtering.
/// Examples: `ACME`, `VC R1`
pub type FieldValue = String;
/// Rendered cell text produced by a column formatter.
/// Examples: `14/02/2026`, `25`, `🟠`
pub type CellText = String;
