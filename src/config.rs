//! Configuration Management
//!
//! Handles persistent configuration storage for driftscan.

use crate::provider::http::DEFAULT_PROVIDER_ENDPOINT;
use crate::resource::ResourceType;
use crate::runner::DEFAULT_PARALLELISM;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout of a single provider read
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// AWS region to enumerate
    #[serde(default)]
    pub region: Option<String>,
    /// AWS shared config profile
    #[serde(default)]
    pub profile: Option<String>,
    /// Provider gateway base URL
    #[serde(default)]
    pub provider_endpoint: Option<String>,
    /// Concurrent reads per resource type
    #[serde(default)]
    pub parallelism: Option<usize>,
    /// Timeout of a single provider read, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Restrict enumeration to these resource types
    #[serde(default)]
    pub resource_types: Option<Vec<String>>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("driftscan").join("config.json"))
    }

    /// Load configuration from the default location
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Ignoring config file: {:#}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective parallelism (config > default)
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PARALLELISM)
    }

    /// Get effective provider endpoint (config > default)
    pub fn effective_provider_endpoint(&self) -> String {
        self.provider_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_PROVIDER_ENDPOINT.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Configured resource type filter, if any
    pub fn resource_type_filter(&self) -> Option<Vec<ResourceType>> {
        self.resource_types
            .as_ref()
            .map(|types| types.iter().map(|t| ResourceType::from(t.as_str())).collect())
    }

    /// Overlay command line values on top of this configuration
    pub fn merge(mut self, overrides: Config) -> Self {
        if overrides.region.is_some() {
            self.region = overrides.region;
        }
        if overrides.profile.is_some() {
            self.profile = overrides.profile;
        }
        if overrides.provider_endpoint.is_some() {
            self.provider_endpoint = overrides.provider_endpoint;
        }
        if overrides.parallelism.is_some() {
            self.parallelism = overrides.parallelism;
        }
        if overrides.request_timeout_secs.is_some() {
            self.request_timeout_secs = overrides.request_timeout_secs;
        }
        if overrides.resource_types.is_some() {
            self.resource_types = overrides.resource_types;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.effective_parallelism(), DEFAULT_PARALLELISM);
        assert_eq!(config.effective_provider_endpoint(), DEFAULT_PROVIDER_ENDPOINT);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.resource_type_filter().is_none());
    }

    #[test]
    fn test_zero_parallelism_falls_back_to_default() {
        let config = Config {
            parallelism: Some(0),
            ..Config::default()
        };
        assert_eq!(config.effective_parallelism(), DEFAULT_PARALLELISM);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            region: Some("eu-west-3".into()),
            parallelism: Some(4),
            resource_types: Some(vec!["aws_sqs_queue".into()]),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.region.as_deref(), Some("eu-west-3"));
        assert_eq!(loaded.effective_parallelism(), 4);
        assert_eq!(
            loaded.resource_type_filter(),
            Some(vec![ResourceType::from("aws_sqs_queue")])
        );
    }

    #[test]
    fn test_load_from_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"region": "us-east-1"}"#).unwrap();
        assert_eq!(config.region.as_deref(), Some("us-east-1"));
        assert!(config.profile.is_none());
        assert_eq!(config.effective_parallelism(), DEFAULT_PARALLELISM);
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = Config {
            region: Some("eu-west-1".into()),
            profile: Some("prod".into()),
            ..Config::default()
        };
        let cli = Config {
            region: Some("eu-west-3".into()),
            ..Config::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.region.as_deref(), Some("eu-west-3"));
        assert_eq!(merged.profile.as_deref(), Some("prod"));
    }
}
