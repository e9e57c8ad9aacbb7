//! Structured logging and secret-scrubbing trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to keep
//! provider API keys out of local logs.

use crate::config::LoggingConfig;
use crate::error::{ProxyError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    static ref BEARER_TOKEN: Regex = Regex::new(r"(?i)bearer\s+[A-Za-z0-9._~+/=\-]+").unwrap();
    static ref API_KEY: Regex = Regex::new(r"sk-[A-Za-z0-9_\-]{8,}").unwrap();
    static ref KEY_PARAM: Regex = Regex::new(r"(?i)([?&](?:api_?key|key|token)=)[^&\s]+").unwrap();
}

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line output.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "compact" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    installed.map_err(|e| ProxyError::Internal(format!("Failed to install logger: {}", e)))
}

/// Sanitizes sensitive information from log messages.
///
/// Replaces bearer tokens, `sk-` style API keys and `key=`/`token=` query
/// parameters with a `\[REDACTED\]` placeholder.
pub fn sanitize(input: &str) -> String {
    let result = BEARER_TOKEN.replace_all(input, "Bearer [REDACTED]");
    let result = API_KEY.replace_all(&result, "[REDACTED_API_KEY]");
    KEY_PARAM.replace_all(&result, "${1}[REDACTED]").into_owned()
}
