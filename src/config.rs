use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::source::{RetryPolicy, SourceLocation};

/// Published CSV export of the headcount plan.
const DEFAULT_HEADCOUNT_URL: &str = "https://docs.google.com/spreadsheets/d/1E9ja83RZseiOC8iGlgsEZ4wk--KD6dFm0OM1bociUB4/export?format=csv";
/// Published CSV export of the recruitment pipeline.
const DEFAULT_PIPELINE_URL: &str = "https://docs.google.com/spreadsheets/d/1xlQ1cMTsIjEP-QZAQvOdgkZHGSfvKh7zIn7rTsYnu5o/export?format=csv";

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_VAR: &str = "HR_DASHBOARD_CONFIG";

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Where the two tables come from and how hard to try fetching them.
///
/// Resolution order: built-in defaults, then the JSON file named by
/// `HR_DASHBOARD_CONFIG` (missing keys keep their defaults), then the
/// `HR_*` environment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub headcount_source: SourceLocation,
    pub pipeline_source: SourceLocation,
    pub retry: RetryPolicy,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            headcount_source: SourceLocation::from(DEFAULT_HEADCOUNT_URL),
            pipeline_source: SourceLocation::from(DEFAULT_PIPELINE_URL),
            retry: RetryPolicy::default(),
            request_timeout_secs: 30,
        }
    }
}

impl DashboardConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        log::debug!("Configuration: {config:?}");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply `HR_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = lookup("HR_HEADCOUNT_SOURCE") {
            self.headcount_source = SourceLocation::from(v);
        }
        if let Some(v) = lookup("HR_PIPELINE_SOURCE") {
            self.pipeline_source = SourceLocation::from(v);
        }
        if let Some(v) = lookup("HR_FETCH_ATTEMPTS") {
            self.retry.max_attempts = v
                .trim()
                .parse()
                .with_context(|| format!("HR_FETCH_ATTEMPTS: '{v}' is not a count"))?;
        }
        if let Some(v) = lookup("HR_FETCH_BACKOFF_MS") {
            self.retry.initial_backoff_ms = v
                .trim()
                .parse()
                .with_context(|| format!("HR_FETCH_BACKOFF_MS: '{v}' is not a duration"))?;
        }
        if let Some(v) = lookup("HR_FETCH_TIMEOUT_SECS") {
            self.request_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("HR_FETCH_TIMEOUT_SECS: '{v}' is not a duration"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_point_at_the_published_sheets() {
        let config = DashboardConfig::default();
        assert!(matches!(config.headcount_source, SourceLocation::Url(ref u) if u.contains("1E9ja83R")));
        assert!(matches!(config.pipeline_source, SourceLocation::Url(ref u) if u.contains("1xlQ1cMT")));
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn overrides_replace_sources_and_retry() {
        let vars = env(&[
            ("HR_HEADCOUNT_SOURCE", "snapshots/headcount.parquet"),
            ("HR_FETCH_ATTEMPTS", " 5 "),
            ("HR_FETCH_BACKOFF_MS", "50"),
            ("HR_PIPELINE_SOURCE", ""),
        ]);
        let mut config = DashboardConfig::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(
            config.headcount_source,
            SourceLocation::File("snapshots/headcount.parquet".into())
        );
        assert_eq!(config.pipeline_source, DashboardConfig::default().pipeline_source);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 50);
    }

    #[test]
    fn invalid_override_is_an_error() {
        let vars = env(&[("HR_FETCH_TIMEOUT_SECS", "soon")]);
        let mut config = DashboardConfig::default();
        let err = config.apply_overrides(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("HR_FETCH_TIMEOUT_SECS"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{ "pipeline_source": "local/pipeline.csv", "retry": {{ "max_attempts": 1 }} }}"#
        )
        .unwrap();
        let config = DashboardConfig::from_file(f.path()).unwrap();

        assert_eq!(
            config.pipeline_source,
            SourceLocation::File("local/pipeline.csv".into())
        );
        assert_eq!(config.headcount_source, DashboardConfig::default().headcount_source);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.initial_backoff_ms, 500);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
