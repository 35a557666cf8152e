//! Configuration management for the OCR gateway

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ocr::PollPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit for uploads
    pub max_upload_bytes: usize,
    /// Directory of sample files served under `/assets`
    pub assets_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tenant used for text extraction
    pub read: BackendCredentials,
    /// Tenant used for table extraction
    pub layout: BackendCredentials,
    pub read_api_version: String,
    pub layout_model: String,
    pub layout_api_version: String,
    pub poll: PollPolicy,
    /// Timeout of each individual backend HTTP request
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct BackendCredentials {
    pub endpoint: String,
    pub api_key: String,
}

impl std::fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 4000,
            max_upload_bytes: 50 * 1024 * 1024,
            assets_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let string_or =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let defaults = ServerConfig::default();
        let poll_defaults = PollPolicy::default();

        Ok(Config {
            server: ServerConfig {
                host: string_or("SERVER_HOST", &defaults.host),
                port: parse_or(&lookup, "PORT", defaults.port)?,
                max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
                assets_dir: lookup("ASSETS_DIR").map(PathBuf::from),
            },
            ocr: OcrConfig {
                read: BackendCredentials {
                    endpoint: required("AZURE_API_ENDPOINT")?,
                    api_key: required("AZURE_API_KEY")?,
                },
                layout: BackendCredentials {
                    endpoint: required("AZURE_API_TABLE_TEXT_ENDPOINT")?,
                    api_key: required("AZURE_API_TABLE_TEXT_KEY")?,
                },
                read_api_version: string_or("OCR_READ_API_VERSION", "v3.2"),
                layout_model: string_or("OCR_LAYOUT_MODEL", "prebuilt-layout"),
                layout_api_version: string_or("OCR_LAYOUT_API_VERSION", "2023-07-31"),
                poll: PollPolicy {
                    interval: Duration::from_millis(parse_or(
                        &lookup,
                        "OCR_POLL_INTERVAL_MS",
                        poll_defaults.interval.as_millis() as u64,
                    )?),
                    max_attempts: parse_or(
                        &lookup,
                        "OCR_POLL_MAX_ATTEMPTS",
                        poll_defaults.max_attempts,
                    )?,
                    max_wait: Duration::from_secs(parse_or(
                        &lookup,
                        "OCR_POLL_MAX_WAIT_SECS",
                        poll_defaults.max_wait.as_secs(),
                    )?),
                },
                request_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "OCR_HTTP_TIMEOUT_SECS",
                    30,
                )?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("AZURE_API_ENDPOINT", "https://read.example.com"),
            ("AZURE_API_KEY", "read-key"),
            ("AZURE_API_TABLE_TEXT_ENDPOINT", "https://layout.example.com"),
            ("AZURE_API_TABLE_TEXT_KEY", "layout-key"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_vars()).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.server.assets_dir.is_none());
        assert_eq!(config.ocr.read.endpoint, "https://read.example.com");
        assert_eq!(config.ocr.layout.api_key, "layout-key");
        assert_eq!(config.ocr.read_api_version, "v3.2");
        assert_eq!(config.ocr.layout_model, "prebuilt-layout");
        assert_eq!(config.ocr.layout_api_version, "2023-07-31");
        assert_eq!(config.ocr.poll, PollPolicy::default());
        assert_eq!(config.ocr.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let mut vars = base_vars();
        vars.insert("PORT", "8080");
        vars.insert("OCR_POLL_INTERVAL_MS", "250");
        vars.insert("OCR_POLL_MAX_ATTEMPTS", "10");
        vars.insert("OCR_POLL_MAX_WAIT_SECS", "15");
        vars.insert("ASSETS_DIR", "./assets");

        let config = load(&vars).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.assets_dir, Some(PathBuf::from("./assets")));
        assert_eq!(config.ocr.poll.interval, Duration::from_millis(250));
        assert_eq!(config.ocr.poll.max_attempts, 10);
        assert_eq!(config.ocr.poll.max_wait, Duration::from_secs(15));
    }

    #[test]
    fn test_missing_backend_key() {
        let mut vars = base_vars();
        vars.remove("AZURE_API_TABLE_TEXT_KEY");

        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AZURE_API_TABLE_TEXT_KEY")));
    }

    #[test]
    fn test_invalid_number() {
        let mut vars = base_vars();
        vars.insert("OCR_POLL_MAX_ATTEMPTS", "many");

        let err = load(&vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "OCR_POLL_MAX_ATTEMPTS", .. }
        ));
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let config = load(&base_vars()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("read-key"));
    }
}
