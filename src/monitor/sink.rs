// Monitoring sink client - fire-and-forget delivery of log records

use crate::config::MonitorConfig;
use crate::error::{ProxyError, Result};
use crate::metrics;
use crate::monitor::record::{LogRecord, RequestTrace, ResponseTrace};
use crate::utils::logging::sanitize;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// HTTP client for the monitoring sink.
///
/// Delivery is at-most-once: every record gets a single `POST`, and failures
/// are logged locally and dropped.
#[derive(Clone)]
pub struct MonitorSink {
    http_client: Client,
    url: Arc<str>,
    enabled: bool,
    sanitize_logs: bool,
}

impl MonitorSink {
    pub fn new(config: &MonitorConfig, sanitize_logs: bool) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(5)))
            .use_rustls_tls()
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create sink HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url: Arc::from(config.sink_url.as_str()),
            enabled: config.enabled,
            sanitize_logs,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// POST a record to the sink. Non-2xx answers count as failures.
    pub async fn send(&self, record: &LogRecord) -> Result<()> {
        let response = self
            .http_client
            .post(self.url.as_ref())
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Sink(format!("sink responded with {}", status)));
        }
        Ok(())
    }

    /// Ship a record on a detached task.
    pub fn dispatch(&self, record: LogRecord) -> JoinHandle<()> {
        let sink = self.clone();
        tokio::spawn(async move { sink.deliver(record).await })
    }

    /// Build the record for a finished exchange and ship it, all on a detached task.
    ///
    /// Nothing here runs on the caller's path, so a failure while building
    /// the record cannot reach the client response.
    pub fn spawn_record(&self, request: RequestTrace, response: ResponseTrace) -> JoinHandle<()> {
        let sink = self.clone();
        tokio::spawn(async move {
            let record = LogRecord::build(&request, &response);

            metrics::record_proxy_request(
                &record.provider,
                &record.endpoint,
                record.status,
                record.stream,
                response.latency.as_secs_f64(),
            );
            if let Some(usage) = record.token_usage {
                metrics::record_tokens(&record.provider, usage.prompt_tokens, usage.completion_tokens);
            }

            if let Err(e) = sink.dispatch(record).await {
                warn!("[monitor] Delivery task failed: {}", e);
            }
        })
    }

    async fn deliver(&self, record: LogRecord) {
        if !self.enabled {
            debug!("Monitoring disabled, dropping {} record", record.endpoint);
            return;
        }

        match self.send(&record).await {
            Ok(()) => {
                metrics::record_sink_dispatch("delivered");
                info!("[monitor] Logged {} request", record.endpoint);
            }
            Err(e) => {
                let outcome = match e {
                    ProxyError::Sink(_) => "rejected",
                    _ => "unreachable",
                };
                metrics::record_sink_dispatch(outcome);

                let message = e.to_string();
                let message = if self.sanitize_logs { sanitize(&message) } else { message };
                warn!("[monitor] Failed to log {} request: {}", record.endpoint, message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::Provider;
    use axum::http::{HeaderMap, Method, StatusCode};
    use bytes::Bytes;
    use chrono::Utc;
    use mockito::Matcher;
    use serde_json::json;

    fn sink(url: String) -> MonitorSink {
        MonitorSink::new(
            &MonitorConfig {
                sink_url: url,
                enabled: true,
                timeout_seconds: 2,
            },
            true,
        )
        .unwrap()
    }

    fn traces() -> (RequestTrace, ResponseTrace) {
        (
            RequestTrace {
                provider: Provider::Ollama,
                method: Method::POST,
                path: "/api/generate".to_string(),
                headers: HeaderMap::new(),
                body: json!({ "model": "phi3:mini", "prompt": "Hi" }),
            },
            ResponseTrace {
                status: StatusCode::OK,
                body: Bytes::from_static(br#"{"response":"Hello!"}"#),
                stream: None,
                latency: Duration::from_millis(5),
                emitted_at: Utc::now(),
            },
        )
    }

    #[tokio::test]
    async fn test_spawn_record_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/logs")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "provider": "ollama",
                "model": "phi3:mini",
                "endpoint": "generate",
                "source": "api-proxy",
                "tokenUsage": { "totalTokens": 2 }
            })))
            .with_status(201)
            .create_async()
            .await;

        let (request, response) = traces();
        sink(format!("{}/api/logs", server.url()))
            .spawn_record(request, response)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_reports_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/logs")
            .with_status(500)
            .create_async()
            .await;

        let (request, response) = traces();
        let record = LogRecord::build(&request, &response);
        let result = sink(format!("{}/api/logs", server.url())).send(&record).await;
        assert!(matches!(result, Err(ProxyError::Sink(_))));
    }

    #[tokio::test]
    async fn test_dispatch_sends_once_and_swallows_rejection() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/logs")
            .match_body(Matcher::PartialJson(json!({ "endpoint": "generate", "status": 200 })))
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let (request, response) = traces();
        let record = LogRecord::build(&request, &response);
        let handle = sink(format!("{}/api/logs", server.url())).dispatch(record);

        assert!(handle.await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_sink_is_swallowed() {
        // Nothing listens on port 9 (discard) in test environments
        let (request, response) = traces();
        let handle = sink("http://127.0.0.1:9/api/logs".to_string()).spawn_record(request, response);
        assert!(handle.await.is_ok());
    }
}
