// CLI module for llm-monitor-proxy

use crate::config::AppConfig;
use crate::upstream::Provider;
use clap::Parser;
use std::path::PathBuf;

/// llm-monitor-proxy - forward LLM API traffic and ship a log record for every call
#[derive(Parser, Debug, Default)]
#[command(name = "llm-monitor-proxy", version, about, long_about = None)]
pub struct Args {
    /// Config file (default: ~/.llm-monitor/config.toml)
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short, env = "PORT")]
    pub port: Option<u16>,

    /// Provider being fronted (ollama, openai, mistral, openrouter)
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Upstream base URL, e.g. http://localhost:11434
    #[arg(long, env = "OLLAMA_ORIGINAL_URL")]
    pub upstream: Option<String>,

    /// Monitoring sink endpoint receiving log records
    #[arg(long, env = "MONITOR_URL")]
    pub monitor_url: Option<String>,

    /// Response cache TTL in milliseconds
    #[arg(long, env = "CACHE_DURATION_MS")]
    pub cache_ttl_ms: Option<u64>,

    /// Disable the response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Layer CLI flags over a loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(provider) = self.provider {
            config.upstream.provider = provider;
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.base_url = Some(upstream.clone());
        }
        if let Some(url) = &self.monitor_url {
            config.monitor.sink_url = url.clone();
        }
        if let Some(ttl_ms) = self.cache_ttl_ms {
            config.cache.ttl_ms = ttl_ms;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}
