// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics,
    REGISTRY,
    PROXY_REQUESTS,
    PROXY_DURATION,
    TOKENS_ESTIMATED,
    CACHE_OPERATIONS,
    CACHE_ENTRIES,
    SINK_DISPATCHES,
};

/// Helper to record a monitored request once its response has been emitted
pub fn record_proxy_request(provider: &str, endpoint: &str, status_code: u16, stream: bool, duration_secs: f64) {
    PROXY_REQUESTS
        .with_label_values(&[provider, endpoint, &status_code.to_string()])
        .inc();

    PROXY_DURATION
        .with_label_values(&[provider, endpoint, &stream.to_string()])
        .observe(duration_secs);
}

/// Helper to record token usage
pub fn record_tokens(provider: &str, prompt: u64, completion: u64) {
    if prompt > 0 {
        TOKENS_ESTIMATED
            .with_label_values(&[provider, "prompt"])
            .inc_by(prompt as f64);
    }
    if completion > 0 {
        TOKENS_ESTIMATED
            .with_label_values(&[provider, "completion"])
            .inc_by(completion as f64);
    }
}

/// Helper to record response cache operations
pub fn record_cache_hit() {
    CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_cache_store() {
    CACHE_OPERATIONS.with_label_values(&["store"]).inc();
}

pub fn record_cache_eviction(count: usize) {
    CACHE_OPERATIONS.with_label_values(&["evict"]).inc_by(count as f64);
}

pub fn update_cache_entries(count: usize) {
    CACHE_ENTRIES.set(count as f64);
}

/// Helper to record the outcome of a sink delivery
pub fn record_sink_dispatch(outcome: &str) {
    SINK_DISPATCHES.with_label_values(&[outcome]).inc();
}
