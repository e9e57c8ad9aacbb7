// Error handling tests

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use llm_monitor_proxy::error::ProxyError;

#[test]
fn test_error_display_messages() {
    let errors = vec![
        ProxyError::Config("bad port".to_string()),
        ProxyError::Upstream("connection refused".to_string()),
        ProxyError::UpstreamTimeout("after 300s".to_string()),
        ProxyError::Sink("sink responded with 500".to_string()),
        ProxyError::InvalidRequest("Bad request".to_string()),
        ProxyError::PayloadTooLarge("too big".to_string()),
        ProxyError::Internal("oops".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_status_codes() {
    let cases = [
        (ProxyError::InvalidRequest(String::new()), StatusCode::BAD_REQUEST),
        (ProxyError::PayloadTooLarge(String::new()), StatusCode::PAYLOAD_TOO_LARGE),
        (ProxyError::Upstream(String::new()), StatusCode::BAD_GATEWAY),
        (ProxyError::UpstreamTimeout(String::new()), StatusCode::GATEWAY_TIMEOUT),
        (ProxyError::Sink(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
        (ProxyError::Config(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        assert_eq!(error.status_code(), expected, "{:?}", error);
    }
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
    let error: ProxyError = io.into();
    assert!(matches!(error, ProxyError::Io(_)));
    assert!(format!("{}", error).contains("config.toml"));
}

#[test]
fn test_json_error_conversion() {
    let parse = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let error: ProxyError = parse.into();
    assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_response_body() {
    let response = ProxyError::Upstream("connection refused".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["error"]["type"], "upstream_error");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}
