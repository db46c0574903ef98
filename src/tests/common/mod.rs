// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use reqwest::Client;

use crate::auth::identity::StaticTokenResolver;
use crate::cache::token_cache::TokenCache;
use crate::config::momo::MomoConfig;
use crate::config::settings::{MetricsConfig, ServerConfig, SettingsConfig};
use crate::server::server::{router, AppState};
use crate::upstream::MomoClient;

pub const SUBSCRIPTION_KEY: &str = "sub-key-123";
pub const USER_ID: &str = "user";
pub const API_KEY: &str = "key";
/// base64("user:key")
pub const BASIC_CREDENTIALS: &str = "Basic dXNlcjprZXk=";
pub const CALLER_TOKEN: &str = "app-token";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn momo_config(base_url: &str) -> MomoConfig {
    MomoConfig {
        base_url: base_url.to_owned(),
        subscription_key: SUBSCRIPTION_KEY.to_owned(),
        user_id: USER_ID.to_owned(),
        api_key: API_KEY.to_owned(),
        target_environment: "sandbox".to_owned(),
    }
}

pub fn settings(metrics_enabled: bool) -> SettingsConfig {
    SettingsConfig {
        safety_margin_seconds: None,
        upstream_timeout_ms: Some(5000),
        metrics: MetricsConfig { path: "/metrics".to_owned(), is_enabled: metrics_enabled },
        server: ServerConfig { host: "127.0.0.1".to_owned(), port: "0".to_owned() },
        logging: None,
    }
}

pub fn momo_client(base_url: &str) -> MomoClient {
    MomoClient::new(momo_config(base_url), build_reqwest_client(), TokenCache::default())
}

pub async fn app_state(momo: MomoClient) -> AppState {
    let callers = StaticTokenResolver::new(HashMap::from([(
        CALLER_TOKEN.to_owned(),
        "mobile-app".to_owned(),
    )]));
    AppState::new(momo, Arc::new(callers)).await
}

/// Proxy in front of `upstream_base_url`, returns its base url and state.
pub async fn start_proxy(upstream_base_url: &str) -> (JoinHandle<()>, String, AppState) {
    start_proxy_with(app_state(momo_client(upstream_base_url)).await, &settings(false)).await
}

pub async fn start_proxy_with(state: AppState, settings: &SettingsConfig) -> (JoinHandle<()>, String, AppState) {
    let (handle, addr) = spawn_axum(router(state.clone(), settings)).await;
    (handle, format!("http://{}", addr), state)
}

/// Token endpoint that checks the credential headers.
pub async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: u64) -> Mock<'a> {
    let token = token.to_owned();
    server
        .mock_async(move |when, then| {
            when.method(POST)
                .path("/collection/token/")
                .header("Authorization", BASIC_CREDENTIALS)
                .header("Ocp-Apim-Subscription-Key", SUBSCRIPTION_KEY)
                .header("X-Target-Environment", "sandbox");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "access_token": token,
                    "token_type": "access_token",
                    "expires_in": expires_in
                }));
        })
        .await
}
