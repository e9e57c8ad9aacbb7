// Response store tests through the public API

use bytes::Bytes;
use llm_monitor_proxy::cache::{cache_key, CacheConfig, CacheEntry, ResponseStore};
use proptest::prelude::*;
use std::time::Duration;

fn entry(body: &'static str) -> CacheEntry {
    CacheEntry::new(Bytes::from_static(body.as_bytes()), "application/json")
}

fn key(uri: &str) -> String {
    cache_key(&uri.parse().unwrap())
}

#[test]
fn test_cache_config_defaults() {
    let config = CacheConfig::default();

    assert!(config.enabled);
    assert_eq!(config.ttl_ms, 300_000);
    assert_eq!(config.ttl(), Duration::from_secs(300));
    assert_eq!(config.sweep_threshold, 100);
}

#[test]
fn test_cache_config_partial_toml() {
    let config: CacheConfig = toml::from_str("ttl_ms = 1000").unwrap();

    assert!(config.enabled);
    assert_eq!(config.ttl_ms, 1000);
    assert_eq!(config.sweep_threshold, 100);
}

#[tokio::test]
async fn test_store_stats_initialization() {
    let store = ResponseStore::new(CacheConfig::default());
    let stats = store.stats();

    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.stores, 0);
    assert_eq!(stats.evictions, 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_store_overwrite_keeps_one_entry() {
    let store = ResponseStore::new(CacheConfig::default());
    store.insert(key("/api/tags"), entry(r#"{"v":1}"#));
    store.insert(key("/api/tags"), entry(r#"{"v":2}"#));

    assert_eq!(store.len(), 1);
    let found = store.get(&key("/api/tags")).unwrap();
    assert_eq!(&found.payload[..], br#"{"v":2}"#);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_drops_only_stale_entries() {
    let store = ResponseStore::new(CacheConfig {
        enabled: true,
        ttl_ms: 1_000,
        sweep_threshold: 3,
    });

    store.insert("old-1".to_string(), entry("{}"));
    store.insert("old-2".to_string(), entry("{}"));
    tokio::time::advance(Duration::from_millis(1_500)).await;
    store.insert("new-1".to_string(), entry("{}"));
    assert_eq!(store.len(), 3);

    // Fourth entry pushes the store past the threshold
    store.insert("new-2".to_string(), entry("{}"));

    assert_eq!(store.len(), 2);
    assert_eq!(store.stats().evictions, 2);
    assert!(store.get("new-1").is_some());
    assert!(store.get("old-1").is_none());
}

#[tokio::test]
async fn test_clear_resets_everything() {
    let store = ResponseStore::new(CacheConfig::default());
    store.insert(key("/api/tags"), entry("{}"));
    store.get(&key("/api/tags"));
    store.clear();

    assert!(store.is_empty());
    assert_eq!(store.stats().hits, 0);
}

proptest! {
    #[test]
    fn test_key_ignores_parameter_order(
        params in proptest::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..6)
    ) {
        let pairs: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let forward = format!("/api/show?{}", pairs.join("&"));
        let reversed: Vec<String> = pairs.iter().rev().cloned().collect();
        let backward = format!("/api/show?{}", reversed.join("&"));

        prop_assert_eq!(key(&forward), key(&backward));
    }

    #[test]
    fn test_key_separates_paths(a in "/[a-z]{1,8}", b in "/[a-z]{1,8}") {
        prop_assume!(a != b);
        prop_assert_ne!(key(&a), key(&b));
    }
}
