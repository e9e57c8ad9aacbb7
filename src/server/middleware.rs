// HTTP middleware - request interception for monitored upstream calls
//
// Per monitored request: capture the body, forward, intercept the response,
// spawn the log record, deliver. Delivery to the client happens exactly once
// and never waits on the record.

use super::routes::AppState;
use crate::error::ProxyError;
use crate::monitor::{MonitorSink, RequestTrace, ResponseTrace, StreamFormat};
use crate::utils::logging::sanitize;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http_body_util::{BodyExt, LengthLimitError};
use std::error::Error as StdError;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Observe monitored requests and ship a log record for each one.
pub async fn intercept(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri());
    if state.config.logging.sanitize_tokens {
        info!("{}", sanitize(&line));
    } else {
        info!("{}", line);
    }

    if !state.is_monitored(request.uri().path()) {
        return next.run(request).await;
    }
    debug!("[proxy] Processing API request: {}", request.uri().path());

    let received_at = Instant::now();
    let (parts, body) = request.into_parts();
    let mut trace = RequestTrace {
        provider: state.upstream.provider(),
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        headers: parts.headers.clone(),
        body: serde_json::Value::Null,
    };

    let response = match body.collect().await {
        Ok(collected) => {
            let raw = collected.to_bytes();
            trace.body = RequestTrace::parse_body(&raw);
            next.run(Request::from_parts(parts, Body::from(raw))).await
        }
        Err(e) => {
            trace.body = RequestTrace::parse_body(b"");
            let error = body_read_error(&e);
            warn!("Failed to read request body: {}", error);
            error.into_response()
        }
    };

    let stream_format = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(StreamFormat::from_content_type);

    match stream_format {
        Some(format) => tee_stream(state.sink.clone(), trace, response, format, received_at),
        None => buffer_response(&state.sink, trace, response, received_at).await,
    }
}

/// Buffer a complete response, hand a copy to the sink, return the same bytes.
async fn buffer_response(
    sink: &MonitorSink,
    trace: RequestTrace,
    response: Response,
    received_at: Instant,
) -> Response {
    let (parts, body) = response.into_parts();
    match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            sink.spawn_record(trace, response_trace(parts.status, bytes.clone(), None, received_at));
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            warn!("Failed to read upstream response: {}", e);
            let failed = ProxyError::Upstream(format!("failed to read response body: {}", e));
            let status = failed.status_code();
            sink.spawn_record(
                trace,
                response_trace(status, Bytes::from(failed.to_string()), None, received_at),
            );
            failed.into_response()
        }
    }
}

/// Pass a streamed response through chunk by chunk while keeping a copy.
/// The record is spawned when the stream ends or is dropped by the client.
fn tee_stream(
    sink: MonitorSink,
    trace: RequestTrace,
    response: Response,
    format: StreamFormat,
    received_at: Instant,
) -> Response {
    let (parts, body) = response.into_parts();
    let mut capture = StreamCapture {
        sink,
        pending: Some(trace),
        status: parts.status,
        format,
        captured: BytesMut::new(),
        received_at,
    };
    let mut upstream = body.into_data_stream();

    let stream = async_stream::stream! {
        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    capture.captured.extend_from_slice(&bytes);
                    yield Ok::<Bytes, axum::Error>(bytes);
                }
                Err(e) => {
                    warn!("Upstream stream failed: {}", e);
                    yield Err(e);
                    break;
                }
            }
        }
        capture.finish();
    };

    Response::from_parts(parts, Body::from_stream(stream))
}

/// Accumulated copy of a streamed response. Spawns its record at most once:
/// on normal completion, or on drop if the client went away mid-stream.
struct StreamCapture {
    sink: MonitorSink,
    pending: Option<RequestTrace>,
    status: StatusCode,
    format: StreamFormat,
    captured: BytesMut,
    received_at: Instant,
}

impl StreamCapture {
    fn finish(&mut self) {
        if let Some(trace) = self.pending.take() {
            let body = std::mem::take(&mut self.captured).freeze();
            self.sink.spawn_record(
                trace,
                response_trace(self.status, body, Some(self.format), self.received_at),
            );
        }
    }
}

impl Drop for StreamCapture {
    fn drop(&mut self) {
        if self.pending.is_none() {
            return;
        }
        // Dropped after runtime shutdown: nowhere left to spawn onto
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("Dropping partial {} record, runtime is gone", self.format.as_str());
            return;
        }
        debug!("Stream ended early, recording partial {} response", self.format.as_str());
        self.finish();
    }
}

fn response_trace(
    status: StatusCode,
    body: Bytes,
    stream: Option<StreamFormat>,
    received_at: Instant,
) -> ResponseTrace {
    ResponseTrace {
        status,
        body,
        stream,
        latency: received_at.elapsed(),
        emitted_at: chrono::Utc::now(),
    }
}

fn body_read_error(err: &axum::Error) -> ProxyError {
    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return ProxyError::PayloadTooLarge("request body exceeds the configured limit".to_string());
        }
        source = cause.source();
    }
    ProxyError::InvalidRequest(format!("failed to read request body: {}", err))
}
