// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramVec, Gauge, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_gauge_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // PROXY METRICS
    // ============================================================================

    /// Total number of monitored requests passing through the proxy
    pub static ref PROXY_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("proxy_requests_total", "Total monitored requests proxied upstream"),
        &["provider", "endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Proxied request latency, measured up to response emission
    pub static ref PROXY_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("proxy_request_duration_seconds", "Proxied request duration in seconds")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "endpoint", "stream"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // TOKEN METRICS
    // ============================================================================

    /// Token counts seen in log records (reported or estimated)
    pub static ref TOKENS_ESTIMATED: CounterVec = register_counter_vec_with_registry!(
        Opts::new("tokens_estimated_total", "Total tokens recorded in log records"),
        &["provider", "kind"], // kind: prompt, completion
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_operations_total", "Total cache operations"),
        &["operation"], // operation: hit, miss, store, evict
        REGISTRY
    ).unwrap();

    /// Current cache entries
    pub static ref CACHE_ENTRIES: Gauge = register_gauge_with_registry!(
        Opts::new("cache_entries", "Current number of cache entries"),
        REGISTRY
    ).unwrap();

    // ============================================================================
    // SINK METRICS
    // ============================================================================

    /// Log record deliveries to the monitoring sink
    pub static ref SINK_DISPATCHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sink_dispatch_total", "Log records sent to the monitoring sink"),
        &["outcome"], // outcome: delivered, rejected, unreachable
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
