//! Configuration Management
//!
//! Handles persistent configuration for aws-resolvers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_strict() -> bool {
    true
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default region for lookups
    #[serde(default)]
    pub region: Option<String>,
    /// Fail on lookup errors instead of resolving to null
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Send every API call to this base URL instead of the AWS endpoints
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            strict: default_strict(),
            endpoint_url: None,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aws-resolvers").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective region (CLI > config). Environment variables and the
    /// shared AWS config files are consulted later by the credentials chain.
    pub fn effective_region(&self, cli_region: Option<&str>) -> Option<String> {
        cli_region
            .map(str::to_string)
            .or_else(|| self.region.clone())
            .filter(|r| !r.trim().is_empty())
    }
}
