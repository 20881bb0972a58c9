//! Configuration management for CISEval
//!
//! This module handles loading, parsing, and validating configuration
//! from YAML files, with CLI and environment overrides applied in `main`.

use crate::error::{CisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for CISEval
///
/// Holds everything the client needs: the remote API location and the
/// session lifecycle parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session lifecycle configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the CIS REST service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Session lifecycle configuration
///
/// The in-memory validity window is enforced actively by the expiry
/// monitor; the storage TTL is a backstop applied to the persisted token
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Token validity window in seconds (active enforcement)
    #[serde(default = "default_validity_secs")]
    pub validity_secs: u64,

    /// Expiry monitor poll interval in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Persisted token record TTL in hours (storage-level backstop)
    #[serde(default = "default_storage_ttl_hours")]
    pub storage_ttl_hours: u64,
}

fn default_validity_secs() -> u64 {
    3600
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_storage_ttl_hours() -> u64 {
    24
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validity_secs: default_validity_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            storage_ttl_hours: default_storage_ttl_hours(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// When `path` is `None`, the platform config directory is probed
    /// (`~/.config/ciseval/config.yaml` on Linux); if no file exists there
    /// either, built-in defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`CisError::Io`] when an explicitly given path cannot be
    /// read, or [`CisError::Yaml`] when the file does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => {
                    tracing::debug!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Platform-specific default config file location.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ciseval")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CisError::Config`] when the base URL does not parse or a
    /// duration is zero.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)
            .map_err(|e| CisError::Config(format!("invalid api.base_url: {}", e)))?;

        if self.api.timeout_secs == 0 {
            return Err(CisError::Config("api.timeout_secs must be non-zero".to_string()).into());
        }
        if self.session.validity_secs == 0 {
            return Err(
                CisError::Config("session.validity_secs must be non-zero".to_string()).into(),
            );
        }
        if self.session.poll_interval_secs == 0 {
            return Err(CisError::Config(
                "session.poll_interval_secs must be non-zero".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.validity_secs, 3600);
        assert_eq!(config.session.poll_interval_secs, 60);
        assert_eq!(config.session.storage_ttl_hours, 24);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "api:\n  base_url: http://cis.example.com:8080\n  timeout_secs: 10\nsession:\n  validity_secs: 1800"
        )
        .expect("write");

        let config = Config::load(Some(file.path())).expect("load");
        assert_eq!(config.api.base_url, "http://cis.example.com:8080");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.session.validity_secs, 1800);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.session.poll_interval_secs, 60);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/ciseval.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_validate_rejects_zero_validity() {
        let mut config = Config::default();
        config.session.validity_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.session.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_parse_error_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "api: [not, a, mapping").expect("write");
        let result = Config::load(Some(file.path()));
        assert!(result.is_err());
    }
}
