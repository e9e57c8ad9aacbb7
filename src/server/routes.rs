// HTTP routes configuration

use super::handlers::{forward_handler, health_handler, metrics_handler};
use super::middleware::intercept;
use crate::cache::{ResponseCacheLayer, ResponseStore};
use crate::config::AppConfig;
use crate::error::Result;
use crate::monitor::MonitorSink;
use crate::upstream::UpstreamClient;
use axum::handler::Handler;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub monitored_prefix: Arc<str>,
    pub upstream: Arc<UpstreamClient>,
    pub sink: MonitorSink,
    pub cache: Arc<ResponseStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let sink = MonitorSink::new(&config.monitor, config.logging.sanitize_tokens)?;
        let cache = ResponseStore::new(config.cache.clone());

        Ok(Self {
            monitored_prefix: Arc::from(config.upstream.resolved_monitored_prefix()),
            upstream: Arc::new(upstream),
            sink,
            cache: Arc::new(cache),
            config: Arc::new(config),
        })
    }

    /// Whether requests to `path` produce log records.
    pub fn is_monitored(&self, path: &str) -> bool {
        path.contains(self.monitored_prefix.as_ref())
    }
}

pub fn create_router(config: AppConfig) -> Result<Router> {
    let state = AppState::new(config)?;
    Ok(build_router(state))
}

/// Assemble the router: local `/_monitor` endpoints, and everything else
/// forwarded upstream through the response cache. The interceptor wraps both.
pub fn build_router(state: AppState) -> Router {
    let forward = ServiceBuilder::new()
        .layer(ResponseCacheLayer::new(state.cache.clone()))
        .service(forward_handler.with_state(state.clone()));

    let max_body_bytes = state.config.limits.max_body_bytes;

    Router::new()
        .route("/_monitor/health", get(health_handler))
        .route("/_monitor/metrics", get(metrics_handler))
        .fallback_service(forward)
        .layer(middleware::from_fn_with_state(state.clone(), intercept))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
