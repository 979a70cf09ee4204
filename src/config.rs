use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    pub source: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
    /// Empty means the built-in fallback set.
    pub fallback_namespaces: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            source: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            fallback_namespaces: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default, alias = "url", alias = "server")]
    base_url: Option<String>,
    #[serde(
        default = "default_request_timeout_secs",
        alias = "timeout",
        alias = "timeout_secs"
    )]
    request_timeout_secs: u64,
    #[serde(default)]
    fallback_namespaces: Vec<String>,
}

impl BrowserConfig {
    /// Loads the first config file found, or defaults when there is none.
    pub fn discover() -> Result<Self> {
        match discover_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&raw, Some(path.display().to_string()))
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    fn parse(raw: &str, source: Option<String>) -> Result<Self> {
        let parsed: ConfigFile = serde_yaml::from_str(raw)?;
        let base_url = parsed
            .base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let fallback_namespaces = parsed
            .fallback_namespaces
            .into_iter()
            .map(|namespace| namespace.trim().to_string())
            .filter(|namespace| !namespace.is_empty())
            .collect();

        Ok(Self {
            source,
            base_url,
            request_timeout: Duration::from_secs(parsed.request_timeout_secs.max(1)),
            fallback_namespaces,
        })
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CRD_BROWSER_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("crd-browser.yaml"),
        PathBuf::from("crd-browser.yml"),
        PathBuf::from(".crd-browser.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/crd-browser/config.yaml"),
            PathBuf::from(&home).join(".config/crd-browser/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{BrowserConfig, DEFAULT_BASE_URL};
    use std::time::Duration;

    #[test]
    fn empty_document_uses_defaults() {
        let config = BrowserConfig::parse("{}", None).expect("config should parse");
        assert_eq!(config, BrowserConfig::default());
    }

    #[test]
    fn fields_and_aliases_are_read() {
        let raw = r#"
server: " http://browser.internal:8080 "
timeout: 3
fallback_namespaces:
  - default
  - " "
  - platform
"#;
        let config = BrowserConfig::parse(raw, Some("test.yaml".to_string()))
            .expect("config should parse");
        assert_eq!(config.base_url, "http://browser.internal:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.fallback_namespaces, vec!["default", "platform"]);
        assert_eq!(config.source.as_deref(), Some("test.yaml"));
    }

    #[test]
    fn blank_url_and_zero_timeout_are_clamped() {
        let config = BrowserConfig::parse("base_url: ''\nrequest_timeout_secs: 0\n", None)
            .expect("config should parse");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(BrowserConfig::parse("base_url: [", None).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = BrowserConfig::load(std::path::Path::new("/nonexistent/crd-browser.yaml"))
            .expect_err("missing file should fail");
        assert!(format!("{error:#}").contains("/nonexistent/crd-browser.yaml"));
    }
}
