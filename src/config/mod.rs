// Configuration module

mod models;

pub use models::*;

use crate::error::{ProxyError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `LLM_MONITOR_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "LLM_MONITOR";

impl AppConfig {
    /// Load configuration from the default config file location.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file (`path`, or `~/.llm-monitor/config.toml`)
    /// 3. Defaults (lowest)
    ///
    /// CLI flags are layered on top by [`crate::cli::Args::apply`].
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            // An explicitly named file has to exist
            Some(p) => File::from(p).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        // Validation waits for CLI overrides, see `validate`
        config
            .try_deserialize()
            .map_err(|e| ProxyError::Config(e.to_string()))
    }

    /// Reject settings the proxy cannot run with.
    pub fn validate(&self) -> Result<()> {
        let base = self.upstream.resolved_base_url();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ProxyError::Config(format!(
                "Upstream base URL must be http(s): {}",
                base
            )));
        }
        if self.monitor.enabled && self.monitor.sink_url.trim().is_empty() {
            return Err(ProxyError::Config(
                "Monitoring is enabled but no sink URL is set".to_string(),
            ));
        }
        if self.cache.ttl_ms == 0 {
            return Err(ProxyError::Config("Cache TTL must be positive".to_string()));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ProxyError::Internal(e.to_string()))
    }

    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".llm-monitor")
            .join("config.toml")
    }
}
