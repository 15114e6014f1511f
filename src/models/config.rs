//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Provider;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and polling behavior settings
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Sink settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Status pages to poll
    #[serde(default = "defaults::providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Render the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.user_agent.trim().is_empty() {
            return Err(AppError::validation("tracker.user_agent is empty"));
        }
        if self.tracker.timeout_secs == 0 {
            return Err(AppError::validation("tracker.timeout_secs must be > 0"));
        }
        if self.tracker.poll_interval_secs == 0 {
            return Err(AppError::validation(
                "tracker.poll_interval_secs must be > 0",
            ));
        }
        if self.tracker.max_concurrent == 0 {
            return Err(AppError::validation("tracker.max_concurrent must be > 0"));
        }
        if self.providers.is_empty() {
            return Err(AppError::validation("No providers defined"));
        }

        let mut names = HashSet::new();
        for provider in &self.providers {
            let name = provider.name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Provider name is empty"));
            }
            if !names.insert(name) {
                return Err(AppError::validation(format!(
                    "Duplicate provider name '{name}'"
                )));
            }

            let url = Url::parse(&provider.url)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(AppError::validation(format!(
                    "Provider '{name}' url must be http or https, got '{}'",
                    url.scheme()
                )));
            }

            if provider.poll_interval_secs == Some(0) {
                return Err(AppError::validation(format!(
                    "Provider '{name}' poll_interval_secs must be > 0"
                )));
            }
        }
        Ok(())
    }

    /// Resolve provider entries into runtime providers, applying the global
    /// poll interval where no override is set.
    pub fn resolved_providers(&self) -> Vec<Provider> {
        self.providers
            .iter()
            .map(|p| Provider {
                name: p.name.trim().to_string(),
                url: p.url.clone(),
                poll_interval: Duration::from_secs(
                    p.poll_interval_secs
                        .unwrap_or(self.tracker.poll_interval_secs),
                ),
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            output: OutputConfig::default(),
            providers: defaults::providers(),
        }
    }
}

/// HTTP client and polling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between polls of the same provider
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,

    /// Idle connections kept per host in the shared pool
    #[serde(default = "defaults::pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Maximum concurrent requests for one-shot checks
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            poll_interval_secs: defaults::poll_interval(),
            pool_max_idle_per_host: defaults::pool_max_idle_per_host(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Output format for reported updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable blocks
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Sink settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// A configured status page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name (e.g., "OpenAI")
    pub name: String,

    /// URL of the incidents JSON
    pub url: String,

    /// Per-provider override of `tracker.poll_interval_secs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
}

mod defaults {
    use super::ProviderConfig;

    pub fn user_agent() -> String {
        concat!("status-tracker/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn poll_interval() -> u64 {
        60
    }
    pub fn pool_max_idle_per_host() -> usize {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }

    pub fn providers() -> Vec<ProviderConfig> {
        vec![ProviderConfig {
            name: "OpenAI".to_string(),
            url: "https://status.openai.com/api/v2/incidents.json".to_string(),
            poll_interval_secs: None,
        }]
    }
}
