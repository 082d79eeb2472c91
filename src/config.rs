//! Configuration Management
//!
//! Handles persistent configuration storage for netgw.

use crate::resource::lifecycle::PollPolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Admin API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token for the admin API
    #[serde(default)]
    pub token: Option<String>,
    /// Default tenant for created gateways
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Delete-confirmation poll attempts (0 disables the poll)
    #[serde(default)]
    pub poll_attempts: Option<u32>,
    /// Delay between poll attempts, in milliseconds
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("netgw").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective endpoint (env > config)
    pub fn effective_endpoint(&self) -> Option<String> {
        std::env::var("NETGW_ENDPOINT")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.endpoint.clone())
    }

    /// Get effective token (env > config)
    pub fn effective_token(&self) -> String {
        std::env::var("NETGW_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.token.clone())
            .unwrap_or_default()
    }

    /// Poll policy for delete confirmation
    pub fn poll_policy(&self) -> PollPolicy {
        let defaults = PollPolicy::default();
        PollPolicy::new(
            self.poll_attempts.unwrap_or(defaults.max_attempts),
            self.poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.delay),
        )
    }
}
