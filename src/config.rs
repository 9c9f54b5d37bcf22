use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::filters::DEFAULT_STATUS_SELECTION;
use crate::constants::source::{
    CACHE_TTL_ENV, DEFAULT_CACHE_TTL_SECS, DEFAULT_SOURCE_ID, DEFAULT_SOURCE_URL, EXPORT_DIR_ENV,
    SOURCE_URL_ENV,
};
use crate::errors::ReportError;
use crate::sort::SortPreset;

/// Controls how the source table is read and normalized.
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// Stable source identifier used in snapshots and error messages.
    pub source_id: Cow<'static, str>,
    /// Remote CSV location.
    pub source_url: String,
    /// Whether header normalization strips diacritics (`ALTERAÇÃO` -> `ALTERACAO`).
    pub strip_diacritics: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            source_id: Cow::Borrowed(DEFAULT_SOURCE_ID),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            strip_diacritics: true,
        }
    }
}

/// Top-level report configuration.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Source loading behavior.
    pub loader: LoaderConfig,
    /// How long a loaded snapshot stays fresh.
    pub cache_ttl: Duration,
    /// Status values pre-selected when the user supplies no status filter.
    ///
    /// Intersected with the statuses present in the data before use.
    pub default_statuses: Vec<String>,
    /// Ordering applied when no explicit sort keys are given.
    pub sort_preset: SortPreset,
    /// Directory receiving XLSX exports.
    pub export_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            default_statuses: DEFAULT_STATUS_SELECTION
                .iter()
                .map(|status| status.to_string())
                .collect(),
            sort_preset: SortPreset::Chronological,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ReportConfig {
    /// Build a config from defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ReportError> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(SOURCE_URL_ENV)
            && !value.trim().is_empty()
        {
            config.loader.source_url = value.trim().to_string();
        }
        if let Ok(value) = std::env::var(CACHE_TTL_ENV)
            && !value.trim().is_empty()
        {
            let secs = value.trim().parse::<u64>().map_err(|_| {
                ReportError::Configuration(format!(
                    "{CACHE_TTL_ENV} must be a whole number of seconds, got '{}'",
                    value.trim()
                ))
            })?;
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Ok(value) = std::env::var(EXPORT_DIR_ENV)
            && !value.trim().is_empty()
        {
            config.export_dir = PathBuf::from(value.trim());
        }
        Ok(config)
    }
}
