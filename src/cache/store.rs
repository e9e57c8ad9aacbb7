// Response store - owns cached responses and their expiry
//
// The store is shared by `Arc` and injected wherever it is needed, so tests
// can `clear()` it between runs without restarting anything.

use crate::cache::models::{CacheConfig, CacheEntry, CacheStats};
use crate::metrics;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// In-memory TTL store for cached responses.
///
/// Concurrent misses for the same key are not coalesced: both go downstream
/// and the last `insert` wins.
pub struct ResponseStore {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl ResponseStore {
    /// Create a new, empty store
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl()
    }

    /// Look up a servable entry. Stale entries are reported as misses but left
    /// in place until a sweep or an overwrite removes them.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = Instant::now();
        let found = self
            .entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl()))
            .cloned();

        let mut stats = self.stats.write();
        if found.is_some() {
            stats.hits += 1;
            metrics::record_cache_hit();
        } else {
            stats.misses += 1;
            metrics::record_cache_miss();
        }
        found
    }

    /// Store an entry, replacing any previous one for `key`.
    ///
    /// Once the store holds more than `sweep_threshold` entries, every store
    /// runs a full scan removing entries older than the TTL. The scan runs
    /// inline on the caller's path.
    pub fn insert(&self, key: String, entry: CacheEntry) {
        let mut entries = self.entries.write();
        entries.insert(key, entry);

        let mut evicted = 0;
        if entries.len() > self.config.sweep_threshold {
            evicted = Self::sweep(&mut entries, self.ttl());
        }
        let len = entries.len();
        drop(entries);

        let mut stats = self.stats.write();
        stats.stores += 1;
        stats.evictions += evicted as u64;
        drop(stats);

        metrics::record_cache_store();
        metrics::update_cache_entries(len);
        if evicted > 0 {
            metrics::record_cache_eviction(evicted);
            debug!("Cache sweep removed {} stale entries, {} remain", evicted, len);
        }
    }

    fn sweep(entries: &mut HashMap<String, CacheEntry>, ttl: Duration) -> usize {
        let before = entries.len();
        let now = Instant::now();
        // Keep entries stored at or after `now - ttl`
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    /// Clear all cached entries and reset statistics
    pub fn clear(&self) {
        self.entries.write().clear();
        *self.stats.write() = CacheStats::default();
        metrics::update_cache_entries(0);
        debug!("Cache cleared");
    }
}
