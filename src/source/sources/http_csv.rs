use std::time::Instant;

use tracing::info;

use crate::config::LoaderConfig;
use crate::data::SourceSnapshot;
use crate::errors::ReportError;
use crate::source::{DataSource, snapshot_from_csv};
use crate::types::SourceId;

/// Source that downloads a CSV export over HTTP(S).
///
/// Non-success status codes, transport errors, and unreadable bodies are all
/// reported as `SourceUnavailable`; nothing is retried.
#[derive(Clone, Debug)]
pub struct HttpCsvSource {
    source_id: SourceId,
    url: String,
    strip_diacritics: bool,
}

impl HttpCsvSource {
    /// Create a source for `url`.
    pub fn new(source_id: impl Into<SourceId>, url: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            url: url.into(),
            strip_diacritics: true,
        }
    }

    /// Create a source from loader configuration.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.source_id.to_string(), config.source_url.clone())
            .with_strip_diacritics(config.strip_diacritics)
    }

    /// Override whether headers have diacritics stripped before alias matching.
    pub fn with_strip_diacritics(mut self, strip_diacritics: bool) -> Self {
        self.strip_diacritics = strip_diacritics;
        self
    }

    /// Remote location this source reads.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_body(&self) -> Result<String, ReportError> {
        let response =
            ureq::get(&self.url)
                .call()
                .map_err(|err| ReportError::SourceUnavailable {
                    source_id: self.source_id.clone(),
                    reason: format!("failed requesting '{}': {err}", self.url),
                })?;
        response
            .into_body()
            .read_to_string()
            .map_err(|err| ReportError::SourceUnavailable {
                source_id: self.source_id.clone(),
                reason: format!("failed reading response body from '{}': {err}", self.url),
            })
    }
}

impl DataSource for HttpCsvSource {
    fn id(&self) -> &str {
        &self.source_id
    }

    fn load(&self) -> Result<SourceSnapshot, ReportError> {
        let started = Instant::now();
        info!("[aging_report:http] fetching {}", self.url);
        let body = self.fetch_body()?;
        let snapshot = snapshot_from_csv(&self.source_id, &body, self.strip_diacritics)?;
        info!(
            "[aging_report:http] loaded source='{}' rows={} bytes={} elapsed={:.2}s",
            self.source_id,
            snapshot.records.len(),
            body.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_copies_loader_settings() {
        let config = LoaderConfig {
            strip_diacritics: false,
            ..LoaderConfig::default()
        };
        let source = HttpCsvSource::from_config(&config);
        assert_eq!(source.id(), config.source_id);
        assert_eq!(source.url(), config.source_url);
        assert!(!source.strip_diacritics);
    }

    #[test]
    fn unreachable_endpoint_is_source_unavailable() {
        // Port 9 on loopback is the discard service and is not expected to accept HTTP.
        let source = HttpCsvSource::new("offline", "http://127.0.0.1:9/export.csv");
        let err = source.load().unwrap_err();
        assert!(err.is_load_error());
        assert!(err.to_string().contains("offline"));
    }
}
