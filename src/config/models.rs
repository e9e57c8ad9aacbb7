//! Configuration data structures for the monitoring proxy.
//!
//! This module defines the schema for the application settings: the listen
//! address, the upstream provider, the monitoring sink, the response cache
//! and logging.

use crate::cache::CacheConfig;
use crate::upstream::Provider;
use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream provider the proxy forwards to.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Where log records are shipped.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Request size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8082`
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Settings for the upstream provider connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Which provider is being fronted.
    /// Default: `ollama`
    #[serde(default)]
    pub provider: Provider,

    /// Base URL requests are forwarded to. Falls back to the provider default.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Path fragment that marks a request as monitored. Falls back to the provider default.
    #[serde(default)]
    pub monitored_prefix: Option<String>,

    /// Whole-request timeout in seconds.
    /// Default: `300` (5 minutes, long generations are common)
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,

    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Settings for the monitoring sink that ingests log records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Endpoint that receives `POST`ed log records.
    /// Default: `http://localhost:3001/api/logs`
    #[serde(default = "default_sink_url")]
    pub sink_url: String,

    /// Whether log records are shipped at all.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default: `10`
    #[serde(default = "default_sink_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask API keys and bearer tokens in local log lines.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_tokens: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest request body accepted, in bytes.
    /// Default: 50 MiB (multimodal prompts carry base64 images)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl UpstreamConfig {
    /// Effective base URL, without a trailing slash.
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn resolved_monitored_prefix(&self) -> String {
        self.monitored_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| self.provider.default_monitored_prefix())
            .to_string()
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            base_url: None,
            monitored_prefix: None,
            timeout_seconds: default_upstream_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sink_url: default_sink_url(),
            enabled: true,
            timeout_seconds: default_sink_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_tokens: true,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// Helper functions for serde defaults
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_upstream_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_sink_url() -> String {
    "http://localhost:3001/api/logs".to_string()
}

fn default_sink_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}
