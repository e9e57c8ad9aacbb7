//! Cache configuration, entry and statistics models.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for the response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// How long a stored response stays servable, in milliseconds.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    /// Entry count above which a store triggers a stale-entry sweep.
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheConfig {
    /// Provides default values for cache configuration.
    ///
    /// - `enabled`: true
    /// - `ttl_ms`: 300000 (5 minutes)
    /// - `sweep_threshold`: 100
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_ms: default_ttl_ms(),
            sweep_threshold: default_sweep_threshold(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_ms() -> u64 {
    300_000
}

fn default_sweep_threshold() -> usize {
    100
}

/// A stored response. Immutable once created; a newer store replaces it whole.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Bytes,
    pub content_type: String,
    pub stored_at: Instant,
}

impl CacheEntry {
    pub fn new(payload: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            payload,
            content_type: content_type.into(),
            stored_at: Instant::now(),
        }
    }

    /// Whether the entry may still be served at `now`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Statistics for cache operations.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Number of requests answered from the cache.
    pub hits: u64,
    /// Number of cacheable requests that went downstream.
    pub misses: u64,
    /// Number of responses written to the cache.
    pub stores: u64,
    /// Number of entries removed by sweeps.
    pub evictions: u64,
}
