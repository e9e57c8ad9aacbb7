//! Log records describing one proxied upstream call.
//!
//! A record is assembled from two halves: the [`RequestTrace`] captured when a
//! monitored request arrives and the [`ResponseTrace`] captured when its
//! response has been emitted to the client.

use crate::monitor::extract::extract;
use crate::monitor::stream::{aggregate, StreamFormat};
use crate::monitor::tokens::TokenUsage;
use crate::upstream::Provider;
use axum::http::{header, HeaderMap, Method, StatusCode};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Value of the `source` field on every record
pub const RECORD_SOURCE: &str = "api-proxy";

/// The record shipped to the monitoring sink.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub method: String,
    pub status: u16,
    /// Milliseconds from request receipt to response emission.
    pub latency: u64,
    pub request_headers: BTreeMap<String, String>,
    pub request_body: Value,
    pub response_body: Value,
    pub source: String,
    pub stream: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_prefix: Option<String>,
}

/// What the interceptor knows about a request before forwarding it.
#[derive(Debug, Clone)]
pub struct RequestTrace {
    pub provider: Provider,
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    /// Parsed copy of the request JSON, `{}` when absent or malformed.
    pub body: Value,
}

/// What the interceptor saw going back to the client.
#[derive(Debug, Clone)]
pub struct ResponseTrace {
    pub status: StatusCode,
    pub body: Bytes,
    pub stream: Option<StreamFormat>,
    pub latency: Duration,
    pub emitted_at: DateTime<Utc>,
}

impl RequestTrace {
    /// Parse the captured request bytes into an independent JSON value.
    ///
    /// Empty or malformed bodies become `{}`; the bytes forwarded upstream are untouched.
    pub fn parse_body(raw: &[u8]) -> Value {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Value::Object(Map::new());
        }
        match serde_json::from_slice(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Error parsing request body: {}", e);
                Value::Object(Map::new())
            }
        }
    }

    /// Last segment of the request path.
    pub fn endpoint(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn model(&self) -> &str {
        self.body
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}

impl ResponseTrace {
    /// Response body as JSON, the aggregate of a stream, or the raw text.
    pub fn body_value(&self) -> Value {
        match self.stream {
            Some(format) => aggregate(format, &self.body),
            None => serde_json::from_slice(&self.body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&self.body).into_owned())),
        }
    }
}

impl LogRecord {
    pub fn build(request: &RequestTrace, response: &ResponseTrace) -> Self {
        let endpoint = request.endpoint().to_string();
        let response_body = response.body_value();
        let extraction = extract(request.provider, &endpoint, &request.body, &response_body);

        let mut record = LogRecord {
            request_id: Uuid::new_v4().to_string(),
            timestamp: response.emitted_at,
            provider: request.provider.name().to_string(),
            model: request.model().to_string(),
            method: request.method.to_string(),
            status: response.status.as_u16(),
            latency: response.latency.as_millis() as u64,
            request_headers: header_map(&request.headers),
            request_body: request.body.clone(),
            response_body,
            source: RECORD_SOURCE.to_string(),
            stream: response.stream.is_some(),
            prompt: None,
            system_message: None,
            completion: None,
            token_usage: None,
            api_key_prefix: None,
            endpoint,
        };

        if let Some(extraction) = extraction {
            record.prompt = Some(extraction.prompt);
            record.system_message = extraction.system_message;
            record.completion = extraction.completion;
            record.token_usage = extraction.token_usage;
        }

        if request.provider.is_openai_compatible() {
            record.api_key_prefix = api_key_prefix(&request.headers);
        }

        record
    }
}

/// Flatten headers into a map, joining repeated values with `", "`.
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

/// First 5 characters of the bearer token, enough to tell keys apart.
fn api_key_prefix(headers: &HeaderMap) -> Option<String> {
    let authorization = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = authorization
        .strip_prefix("Bearer ")
        .unwrap_or(authorization)
        .trim();
    if token.is_empty() {
        return None;
    }
    Some(format!("{}...", token.chars().take(5).collect::<String>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn request(provider: Provider, path: &str, body: Value) -> RequestTrace {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        RequestTrace {
            provider,
            method: Method::POST,
            path: path.to_string(),
            headers,
            body,
        }
    }

    fn response(status: StatusCode, body: &'static str) -> ResponseTrace {
        ResponseTrace {
            status,
            body: Bytes::from_static(body.as_bytes()),
            stream: None,
            latency: Duration::from_millis(42),
            emitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_record() {
        let record = LogRecord::build(
            &request(Provider::Ollama, "/api/generate", json!({ "model": "phi3:mini", "prompt": "Hi" })),
            &response(StatusCode::OK, r#"{"response":"Hello!"}"#),
        );

        assert_eq!(record.provider, "ollama");
        assert_eq!(record.model, "phi3:mini");
        assert_eq!(record.endpoint, "generate");
        assert_eq!(record.status, 200);
        assert_eq!(record.latency, 42);
        assert_eq!(record.prompt.as_deref(), Some("Hi"));
        assert_eq!(record.completion.as_deref(), Some("Hello!"));
        assert_eq!(record.token_usage.unwrap().total_tokens, 2);
        assert_eq!(record.source, "api-proxy");
        assert_eq!(record.api_key_prefix, None);
    }

    #[test]
    fn test_generic_record_has_no_derived_fields() {
        let record = LogRecord::build(
            &request(Provider::Ollama, "/api/tags", json!({})),
            &response(StatusCode::OK, r#"{"models":[]}"#),
        );

        assert_eq!(record.model, "unknown");
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("prompt").is_none());
        assert!(value.get("tokenUsage").is_none());
        assert_eq!(value["responseBody"], json!({ "models": [] }));
        assert_eq!(value["requestHeaders"]["content-type"], "application/json");
    }

    #[test]
    fn test_opaque_response_body_is_logged_raw() {
        let record = LogRecord::build(
            &request(Provider::Ollama, "/api/generate", json!({ "prompt": "Hi" })),
            &response(StatusCode::BAD_GATEWAY, "upstream down"),
        );

        assert_eq!(record.status, 502);
        assert_eq!(record.response_body, json!("upstream down"));
        assert_eq!(record.completion.as_deref(), Some(""));
    }

    #[test]
    fn test_openai_key_prefix() {
        let mut trace = request(Provider::OpenAi, "/v1/chat/completions", json!({ "model": "gpt-4o" }));
        trace
            .headers
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer sk-abcdef123456"));

        let record = LogRecord::build(&trace, &response(StatusCode::OK, r#"{"choices":[]}"#));
        assert_eq!(record.endpoint, "completions");
        assert_eq!(record.api_key_prefix.as_deref(), Some("sk-ab..."));
    }

    #[test]
    fn test_parse_body_defaults_to_empty_object() {
        assert_eq!(RequestTrace::parse_body(b""), json!({}));
        assert_eq!(RequestTrace::parse_body(b"{not json"), json!({}));
        assert_eq!(RequestTrace::parse_body(br#"{"model":"m"}"#), json!({ "model": "m" }));
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));
        assert_eq!(header_map(&headers)["x-tag"], "a, b");
    }
}
