// llm-monitor-proxy - logging reverse proxy and response cache for LLM provider APIs

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod server;
pub mod upstream;
pub mod utils;
