// Tower middleware serving GET responses from the response store

use crate::cache::key::cache_key;
use crate::cache::models::CacheEntry;
use crate::cache::store::ResponseStore;
use crate::error::ProxyError;
use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Response header carrying the hit/miss marker.
pub const CACHE_HIT_HEADER: &str = "x-cache-hit";

/// Layer wrapping a service in a [`ResponseCache`].
#[derive(Clone)]
pub struct ResponseCacheLayer {
    store: Arc<ResponseStore>,
}

impl ResponseCacheLayer {
    pub fn new(store: Arc<ResponseStore>) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for ResponseCacheLayer {
    type Service = ResponseCache<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseCache {
            inner,
            store: self.store.clone(),
        }
    }
}

/// Caches successful JSON responses to GET requests.
///
/// The inner service sees only misses. Its response is buffered, stored when
/// the status is 2xx and the body parses as JSON, then passed on unchanged.
#[derive(Clone)]
pub struct ResponseCache<S> {
    inner: S,
    store: Arc<ResponseStore>,
}

impl<S> Service<Request<Body>> for ResponseCache<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let store = self.store.clone();

        Box::pin(async move {
            if !store.is_enabled() || request.method() != Method::GET {
                return inner.call(request).await;
            }

            let key = cache_key(request.uri());
            if let Some(entry) = store.get(&key) {
                debug!("Cache hit: {}", key);
                return Ok(replay(entry));
            }

            debug!("Cache miss: {}", key);
            let response = inner.call(request).await?;
            Ok(store_if_cacheable(&store, key, response).await)
        })
    }
}

fn replay(entry: CacheEntry) -> Response {
    let content_type = HeaderValue::from_str(&entry.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/json"));

    let mut response = Response::new(Body::from(entry.payload));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(CACHE_HIT_HEADER, HeaderValue::from_static("true"));
    response
}

async fn store_if_cacheable(store: &ResponseStore, key: String, response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(CACHE_HIT_HEADER, HeaderValue::from_static("false"));

    if !parts.status.is_success() {
        return Response::from_parts(parts, body);
    }

    let payload = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to buffer response for {}: {}", key, e);
            let mut failed = ProxyError::Upstream(format!("failed to read response body: {}", e))
                .into_response();
            failed
                .headers_mut()
                .insert(CACHE_HIT_HEADER, HeaderValue::from_static("false"));
            return failed;
        }
    };

    if serde_json::from_slice::<serde::de::IgnoredAny>(&payload).is_ok() {
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        store.insert(key, CacheEntry::new(payload.clone(), content_type));
    } else {
        debug!("Not caching non-JSON response for {}", key);
    }

    Response::from_parts(parts, Body::from(payload))
}
