// Configuration loading and CLI override tests

use clap::Parser;
use llm_monitor_proxy::cli::Args;
use llm_monitor_proxy::config::AppConfig;
use llm_monitor_proxy::error::ProxyError;
use llm_monitor_proxy::upstream::Provider;
use std::io::Write;
use tokio_test::{assert_err, assert_ok};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
[server]
port = 9100

[upstream]
provider = "openrouter"

[cache]
ttl_ms = 60000
"#,
    );

    let config = assert_ok!(AppConfig::load_from(Some(file.path())));
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.upstream.provider, Provider::OpenRouter);
    assert_eq!(config.upstream.resolved_base_url(), Provider::OpenRouter.default_base_url());
    assert_eq!(config.upstream.resolved_monitored_prefix(), "/v1/");
    assert_eq!(config.cache.ttl_ms, 60_000);
    assert!(config.cache.enabled);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert_err!(AppConfig::load_from(Some(&missing)));
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let file = write_config(
        r#"
[upstream]
base_url = "ftp://models.local"
"#,
    );

    let config = assert_ok!(AppConfig::load_from(Some(file.path())));
    assert!(matches!(config.validate(), Err(ProxyError::Config(_))));
}

#[test]
fn test_cli_upstream_replaces_bad_file_value() {
    let file = write_config(
        r#"
[upstream]
base_url = "ftp://models.local"
"#,
    );

    let mut config = assert_ok!(AppConfig::load_from(Some(file.path())));
    let args = Args::parse_from(["llm-monitor-proxy", "--upstream", "http://gpu-box:11434"]);
    args.apply(&mut config);

    assert_eq!(config.upstream.resolved_base_url(), "http://gpu-box:11434");
    assert_ok!(config.validate());
}

#[test]
fn test_rendered_toml_loads_back() {
    let mut original = AppConfig::default();
    original.server.port = 9200;
    original.monitor.sink_url = "http://monitor:3001/api/logs".to_string();
    let file = write_config(&original.to_toml().unwrap());

    let loaded = assert_ok!(AppConfig::load_from(Some(file.path())));
    assert_eq!(loaded.server.port, 9200);
    assert_eq!(loaded.monitor.sink_url, "http://monitor:3001/api/logs");
}

#[test]
fn test_cli_flags_override_config() {
    let args = Args::parse_from([
        "llm-monitor-proxy",
        "--host",
        "0.0.0.0",
        "--port",
        "9300",
        "--provider",
        "mistral",
        "--upstream",
        "http://mistral-gw:8080",
        "--monitor-url",
        "http://monitor:3001/api/logs",
        "--cache-ttl-ms",
        "1500",
        "--no-cache",
    ]);

    let mut config = AppConfig::default();
    args.apply(&mut config);

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9300);
    assert_eq!(config.upstream.provider, Provider::Mistral);
    assert_eq!(config.upstream.resolved_base_url(), "http://mistral-gw:8080");
    assert_eq!(config.monitor.sink_url, "http://monitor:3001/api/logs");
    assert_eq!(config.cache.ttl_ms, 1500);
    assert!(!config.cache.enabled);
    assert_ok!(config.validate());
}

#[test]
fn test_cli_rejects_unknown_provider() {
    let result = Args::try_parse_from(["llm-monitor-proxy", "--provider", "gemini"]);
    assert_err!(result);
}

#[test]
fn test_zero_ttl_fails_validation() {
    let mut config = AppConfig::default();
    config.cache.ttl_ms = 0;
    assert_err!(config.validate());
}
