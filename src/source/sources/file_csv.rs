use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::SourceSnapshot;
use crate::errors::ReportError;
use crate::source::{DataSource, snapshot_from_csv};
use crate::types::SourceId;

/// Source that reads a CSV export saved on disk.
#[derive(Clone, Debug)]
pub struct CsvFileSource {
    source_id: SourceId,
    path: PathBuf,
    strip_diacritics: bool,
}

impl CsvFileSource {
    /// Create a source for `path`; the id defaults to `file:<path>`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source_id: format!("file:{}", path.display()),
            path,
            strip_diacritics: true,
        }
    }

    /// Override the source id.
    pub fn with_id(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Override whether headers have diacritics stripped before alias matching.
    pub fn with_strip_diacritics(mut self, strip_diacritics: bool) -> Self {
        self.strip_diacritics = strip_diacritics;
        self
    }

    /// Path this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvFileSource {
    fn id(&self) -> &str {
        &self.source_id
    }

    fn load(&self) -> Result<SourceSnapshot, ReportError> {
        let bytes = fs::read(&self.path).map_err(|err| ReportError::SourceUnavailable {
            source_id: self.source_id.clone(),
            reason: format!("failed reading {}: {err}", self.path.display()),
        })?;
        let payload = String::from_utf8_lossy(&bytes);
        let snapshot = snapshot_from_csv(&self.source_id, &payload, self.strip_diacritics)?;
        info!(
            "[aging_report:file] loaded source='{}' rows={}",
            self.source_id,
            snapshot.records.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_csv_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.csv");
        fs::write(&path, "CLIENTE,STATUS\nACME,VC\nGlobex,VC R1\n").unwrap();

        let source = CsvFileSource::new(&path).with_id("local");
        let snapshot = source.load().unwrap();
        assert_eq!(snapshot.source_id, "local");
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[1].status, "VC R1");
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempdir().unwrap();
        let source = CsvFileSource::new(dir.path().join("absent.csv"));
        let err = source.load().unwrap_err();
        assert!(matches!(err, ReportError::SourceUnavailable { .. }));
        assert!(source.id().starts_with("file:"));
    }
}
