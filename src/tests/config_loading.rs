use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use crate::config::settings::LogFormat;
use crate::utils::config_loader;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const MINIMAL: &str = r#"
settings:
  server:
    host: "127.0.0.1"
    port: "8080"
momo:
  base_url: "${MOMO_PROXY_TEST_BASE_URL:https://sandbox.momodeveloper.mtn.com/}"
  subscription_key: "${MOMO_PROXY_TEST_SUBSCRIPTION_KEY}"
  user_id: " user "
  api_key: "key"
  target_environment: "${MOMO_PROXY_TEST_TARGET_ENV}"
"#;

#[tokio::test]
#[serial]
async fn defaults_are_filled_in_after_expansion() {
    std::env::remove_var("MOMO_PROXY_TEST_BASE_URL");
    std::env::remove_var("MOMO_PROXY_TEST_TARGET_ENV");
    std::env::set_var("MOMO_PROXY_TEST_SUBSCRIPTION_KEY", "sub-key-123");
    let file = write_config(MINIMAL);

    let cfg = config_loader::run(file.path().to_str().unwrap()).await.unwrap();

    assert_eq!(cfg.momo.base_url, "https://sandbox.momodeveloper.mtn.com");
    assert_eq!(cfg.momo.target_environment, "sandbox");
    assert_eq!(cfg.momo.subscription_key, "sub-key-123");
    assert_eq!(cfg.momo.user_id, "user");

    let logging = cfg.settings.logging.unwrap();
    assert_eq!(logging.level, "info");
    assert_eq!(logging.format, LogFormat::Compact);
    assert!(!cfg.settings.metrics.is_enabled);
    assert_eq!(cfg.settings.metrics.path, "/metrics");
    assert!(cfg.inbound_auth.tokens.is_empty());
    assert_eq!(cfg.settings.server.bind_addr(), "127.0.0.1:8080");
}

#[tokio::test]
#[serial]
async fn environment_overrides_defaults() {
    std::env::set_var("MOMO_PROXY_TEST_BASE_URL", "https://proxy.momoapi.mtn.com");
    std::env::set_var("MOMO_PROXY_TEST_TARGET_ENV", "mtnuganda");
    std::env::set_var("MOMO_PROXY_TEST_SUBSCRIPTION_KEY", "live-key");
    let file = write_config(MINIMAL);

    let cfg = config_loader::run(file.path().to_str().unwrap()).await.unwrap();

    assert_eq!(cfg.momo.base_url, "https://proxy.momoapi.mtn.com");
    assert_eq!(cfg.momo.target_environment, "mtnuganda");
    assert_eq!(cfg.momo.subscription_key, "live-key");

    std::env::remove_var("MOMO_PROXY_TEST_BASE_URL");
    std::env::remove_var("MOMO_PROXY_TEST_TARGET_ENV");
    std::env::remove_var("MOMO_PROXY_TEST_SUBSCRIPTION_KEY");
}

#[tokio::test]
async fn missing_credentials_do_not_prevent_startup() {
    let file = write_config(
        r#"
settings:
  server: { host: "0.0.0.0", port: "8080" }
momo:
  subscription_key: ""
  user_id: ""
  api_key: ""
"#,
    );

    let cfg = config_loader::run(file.path().to_str().unwrap()).await.unwrap();

    assert!(!cfg.momo.has_subscription_key());
    assert!(!cfg.momo.has_user_id());
    assert!(!cfg.momo.has_api_key());
}

#[tokio::test]
async fn invalid_settings_are_reported_together() {
    let file = write_config(
        r#"
settings:
  upstream_timeout_ms: 0
  server: { host: "0.0.0.0", port: "not-a-port" }
  metrics: { is_enabled: true, path: "/health" }
  logging: { level: "loud", format: "json" }
momo:
  base_url: "ftp://example.com"
  subscription_key: "k"
  user_id: "u"
  api_key: "a"
"#,
    );

    let err = config_loader::run(file.path().to_str().unwrap()).await.unwrap_err().to_string();

    for expected in [
        "settings.upstream_timeout_ms",
        "settings.server.port",
        "settings.metrics.path",
        "settings.logging.level",
        "momo.base_url",
    ] {
        assert!(err.contains(expected), "missing '{expected}' in: {err}");
    }
}

#[tokio::test]
async fn inbound_tokens_must_name_a_caller() {
    let file = write_config(
        r#"
settings:
  server: { host: "0.0.0.0", port: "8080" }
momo:
  subscription_key: "k"
  user_id: "u"
  api_key: "a"
inbound_auth:
  tokens:
    app-token: "mobile-app"
    other-token: ""
"#,
    );

    let err = config_loader::run(file.path().to_str().unwrap()).await.unwrap_err().to_string();
    assert!(err.contains("inbound_auth"), "{err}");
}

#[tokio::test]
async fn unreadable_yaml_is_an_error() {
    let file = write_config("settings: [not, a, map");

    let err = config_loader::run(file.path().to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().starts_with("Invalid config"));
}

#[tokio::test]
async fn missing_file_is_an_error() {
    assert!(config_loader::run("/nonexistent/momo-proxy.yaml").await.is_err());
}
