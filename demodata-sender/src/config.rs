// Demodata Sender - Transport configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Transport configuration file.
//!
//! ```json
//! {
//!   "endpoint": "https://ingest.example.com",
//!   "method": "POST",
//!   "path": "/",
//!   "headers": { "x-device-id": "demo-01" },
//!   "timeoutMs": 10000
//! }
//! ```
//!
//! Only `endpoint` is required.

use crate::error::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "ARC_CONFIG_PATH";

/// Configuration file used when neither a path nor the variable is given.
pub const DEFAULT_CONFIG_FILE: &str = "arc.json";

/// Where and how snapshots are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    /// Base URL of the ingestion endpoint.
    pub endpoint: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl TransportConfig {
    /// Configuration for `endpoint` with every other field defaulted.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: default_method(),
            path: default_path(),
            headers: BTreeMap::new(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Parse and validate a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the endpoint, method and headers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.url()?;
        self.http_method()?;
        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
            HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
        }
        Ok(())
    }

    /// Full request URL: endpoint joined with path.
    pub fn url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason,
        };

        let base = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
        }

        let joined = format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| invalid(e.to_string()))
    }

    /// Request method.
    pub fn http_method(&self) -> Result<Method, ConfigError> {
        Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(self.method.clone()))
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Resolve the configuration file: explicit path, then
/// [`CONFIG_PATH_ENV`], then [`DEFAULT_CONFIG_FILE`].
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    resolve_config_path_from(explicit, std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

/// [`resolve_config_path`] with the environment value supplied.
pub fn resolve_config_path_from(explicit: Option<&Path>, from_env: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match from_env {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = TransportConfig::from_json_str(r#"{"endpoint":"http://localhost:8080"}"#)
            .unwrap();
        assert_eq!(config.method, "POST");
        assert_eq!(config.path, "/");
        assert!(config.headers.is_empty());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config, TransportConfig::new("http://localhost:8080"));
    }

    #[test]
    fn test_full_document() {
        let file = write_config(
            r#"{
                "endpoint": "https://ingest.example.com/api/",
                "method": "put",
                "path": "/v1/telemetry",
                "headers": {"x-device-id": "demo-01"},
                "timeoutMs": 2500
            }"#,
        );
        let config = TransportConfig::load(file.path()).unwrap();
        assert_eq!(config.http_method().unwrap(), Method::PUT);
        assert_eq!(
            config.url().unwrap().as_str(),
            "https://ingest.example.com/api/v1/telemetry"
        );
        assert_eq!(config.headers["x-device-id"], "demo-01");
        assert_eq!(config.timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_root_path_join() {
        let config = TransportConfig::new("http://localhost:8080");
        assert_eq!(config.url().unwrap().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TransportConfig::load(dir.path().join("arc.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("{ not json");
        let err = TransportConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let file = write_config(r#"{"method":"POST"}"#);
        let err = TransportConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_endpoint() {
        for endpoint in ["not a url", "ftp://example.com", ""] {
            let err = TransportConfig::new(endpoint).validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEndpoint { .. }),
                "{endpoint:?} accepted"
            );
        }
    }

    #[test]
    fn test_invalid_method_and_header() {
        let mut config = TransportConfig::new("http://localhost");
        config.method = "BAD METHOD".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidMethod(_)
        ));

        let mut config = TransportConfig::new("http://localhost");
        config
            .headers
            .insert("bad header".to_string(), "v".to_string());
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidHeader(_)
        ));
    }

    #[test]
    fn test_resolution_order() {
        let explicit = Path::new("/etc/demo/explicit.json");
        let env = Some(PathBuf::from("/etc/demo/env.json"));

        assert_eq!(
            resolve_config_path_from(Some(explicit), env.clone()),
            PathBuf::from("/etc/demo/explicit.json")
        );
        assert_eq!(
            resolve_config_path_from(None, env),
            PathBuf::from("/etc/demo/env.json")
        );
        assert_eq!(
            resolve_config_path_from(None, Some(PathBuf::new())),
            PathBuf::from(DEFAULT_CONFIG_FILE)
        );
        assert_eq!(
            resolve_config_path_from(None, None),
            PathBuf::from(DEFAULT_CONFIG_FILE)
        );
    }
}
