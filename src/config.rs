//! User-level configuration for scanhealth
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/scanhealth/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default bound on one enrichment request, in seconds.
pub const DEFAULT_ENRICH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    /// Explanation-service endpoint URL
    pub endpoint: Option<String>,

    /// Bearer token sent with enrichment requests
    pub api_key: Option<String>,

    /// Per-request timeout in seconds (default: 30)
    pub timeout_secs: Option<u64>,
}

impl CoreConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/scanhealth/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = CoreConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| Self::from_file(&p))
        {
            config.merge(user_config);
        }

        // Environment variables override everything
        if let Ok(endpoint) = std::env::var("SCANHEALTH_ENRICH_URL") {
            config.enrichment.endpoint = Some(endpoint);
        }
        if let Ok(key) = std::env::var("SCANHEALTH_API_KEY") {
            config.enrichment.api_key = Some(key);
        }

        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("scanhealth").join("config.toml"))
    }

    /// Read one config file; unreadable or invalid TOML counts as absent.
    pub fn from_file(path: &std::path::Path) -> Option<Self> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: CoreConfig) {
        if other.enrichment.endpoint.is_some() {
            self.enrichment.endpoint = other.enrichment.endpoint;
        }
        if other.enrichment.api_key.is_some() {
            self.enrichment.api_key = other.enrichment.api_key;
        }
        if other.enrichment.timeout_secs.is_some() {
            self.enrichment.timeout_secs = other.enrichment.timeout_secs;
        }
    }

    /// Get the configured endpoint, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.enrichment.endpoint.as_deref()
    }

    /// Per-request timeout, with the 30s default applied
    pub fn enrich_timeout(&self) -> Duration {
        Duration::from_secs(
            self.enrichment
                .timeout_secs
                .unwrap_or(DEFAULT_ENRICH_TIMEOUT_SECS),
        )
    }
}
