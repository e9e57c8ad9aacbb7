// HTTP request handlers

use super::routes::AppState;
use crate::cache::CacheStats;
use crate::metrics::gather_metrics;
use axum::extract::{Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub provider: String,
    pub upstream: String,
    pub monitored_prefix: String,
    pub sink: SinkStatus,
    pub cache: CacheStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct SinkStatus {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub enabled: bool,
    pub entries: usize,
    pub ttl_ms: u64,
    #[serde(flatten)]
    pub stats: CacheStats,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    // Running without a sink still proxies, but nothing is being recorded
    let status = if state.sink.is_enabled() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status,
        provider: state.upstream.provider().to_string(),
        upstream: state.upstream.base_url().to_string(),
        monitored_prefix: state.monitored_prefix.to_string(),
        sink: SinkStatus {
            enabled: state.sink.is_enabled(),
            url: state.sink.url().to_string(),
        },
        cache: CacheStatus {
            enabled: state.cache.is_enabled(),
            entries: state.cache.len(),
            ttl_ms: state.cache.config().ttl_ms,
            stats: state.cache.stats(),
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Prometheus scrape endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Fallback handler: forward anything not served locally to the upstream provider
pub async fn forward_handler(State(state): State<AppState>, request: Request) -> Response {
    match state.upstream.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Upstream request failed: {}", e);
            e.into_response()
        }
    }
}
