//! Client configuration.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;

use docflow_core::query::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue(var.to_string(), reason.into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the document API, without a trailing slash.
    pub api_url: String,
    /// Where the session file lives; `None` means the OS data directory.
    pub session_dir: Option<PathBuf>,
    pub page_size: u32,
    pub http_timeout: Duration,
    pub log_json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_json: false,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file is read first, except in tests.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = match get("DOCFLOW_API_URL") {
            Some(url) => parse_api_url(&url)?,
            None => defaults.api_url,
        };

        let session_dir = get("DOCFLOW_SESSION_DIR").map(PathBuf::from);

        let page_size = match get("DOCFLOW_PAGE_SIZE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("DOCFLOW_PAGE_SIZE", format!("'{raw}' is not a positive integer"))),
            },
            None => defaults.page_size,
        };

        let http_timeout = match get("DOCFLOW_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if n > 0 => Duration::from_secs(n),
                _ => {
                    return Err(invalid(
                        "DOCFLOW_HTTP_TIMEOUT_SECS",
                        format!("'{raw}' is not a positive number of seconds"),
                    ));
                }
            },
            None => defaults.http_timeout,
        };

        let log_json = match get("DOCFLOW_LOG_JSON") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid("DOCFLOW_LOG_JSON", format!("'{raw}' is not a boolean"))
            })?,
            None => defaults.log_json,
        };

        Ok(Self {
            api_url,
            session_dir,
            page_size,
            http_timeout,
            log_json,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim_end_matches('/');
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(url.to_string()),
        _ => Err(invalid(
            "DOCFLOW_API_URL",
            format!("'{raw}' must be an http(s) URL"),
        )),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(config(&[]).unwrap(), ClientConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            ("DOCFLOW_API_URL", "https://docs.corp.io/api/"),
            ("DOCFLOW_SESSION_DIR", "/tmp/docflow"),
            ("DOCFLOW_PAGE_SIZE", "25"),
            ("DOCFLOW_HTTP_TIMEOUT_SECS", "5"),
            ("DOCFLOW_LOG_JSON", "yes"),
        ])
        .unwrap();

        assert_eq!(cfg.api_url, "https://docs.corp.io/api");
        assert_eq!(cfg.session_dir, Some(PathBuf::from("/tmp/docflow")));
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));
        assert!(cfg.log_json);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config(&[("DOCFLOW_API_URL", "ftp://x")]).is_err());
        assert!(config(&[("DOCFLOW_PAGE_SIZE", "0")]).is_err());
        assert!(config(&[("DOCFLOW_HTTP_TIMEOUT_SECS", "soon")]).is_err());
        assert_eq!(
            config(&[("DOCFLOW_LOG_JSON", "maybe")]).unwrap_err(),
            ConfigError::InvalidValue(
                "DOCFLOW_LOG_JSON".to_string(),
                "'maybe' is not a boolean".to_string()
            )
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        assert_eq!(config(&[("DOCFLOW_PAGE_SIZE", "  ")]).unwrap().page_size, 10);
    }
}
