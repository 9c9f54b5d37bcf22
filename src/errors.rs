use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for source loading, configuration, and export failures.
///
/// Per-cell parse problems never surface here; they degrade to missing values
/// inside the loader.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The source could not be reached or read.
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Source that failed.
        source_id: SourceId,
        /// Transport or filesystem error text.
        reason: String,
    },
    /// The source answered but the table lacks required columns or is empty.
    #[error("data source '{source_id}' returned an unusable table: {details}")]
    SourceInconsistent {
        /// Source that failed.
        source_id: SourceId,
        /// What was wrong with the table.
        details: String,
    },
    /// Local IO failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Invalid user input or environment value.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The workbook could not be written.
    #[error("export failed: {0}")]
    Export(String),
}

impl ReportError {
    /// Returns `true` for failures that belong to a single refresh cycle.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ReportError::SourceUnavailable { .. } | ReportError::SourceInconsistent { .. }
        )
    }
}
