use httpmock::Method::GET;
use httpmock::MockServer;
use reqwest::StatusCode;
use serde_json::Value;

use super::common::*;
use crate::observability::metrics::get_metrics;

// nothing listens here
const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:1";

#[tokio::test]
async fn health_is_ok_without_upstream() {
    let (proxy, proxy_url, state) = start_proxy(UNREACHABLE_UPSTREAM).await;

    let response = build_reqwest_client()
        .get(format!("{}/health", proxy_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("OK"));
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    assert_eq!(state.momo.tokens().peek(crate::cache::token::ProductLine::Collection).await, None);
    proxy.abort();
}

#[tokio::test]
async fn unknown_routes_and_methods_get_the_not_found_envelope() {
    let (proxy, proxy_url, _) = start_proxy(UNREACHABLE_UPSTREAM).await;
    let client = build_reqwest_client();

    let requests = [
        client.get(format!("{}/nope", proxy_url)),
        client.get(format!("{}/api/requesttopay", proxy_url)),
        client.post(format!("{}/api/balance", proxy_url)),
        client.get(format!("{}/api/transaction/", proxy_url)),
        client.get(format!("{}/metrics", proxy_url)),
    ];

    for request in requests {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"success": false, "message": "Endpoint not found"}));
    }
    proxy.abort();
}

#[tokio::test]
async fn diagnostics_expose_flags_but_not_secrets() {
    let (proxy, proxy_url, _) = start_proxy(UNREACHABLE_UPSTREAM).await;

    let response = build_reqwest_client()
        .get(format!("{}/test", proxy_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = response.text().await.unwrap();
    assert!(!text.contains(SUBSCRIPTION_KEY));
    assert!(!text.contains("\"apiKey\""));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["config"],
        json!({
            "baseUrl": UNREACHABLE_UPSTREAM,
            "targetEnvironment": "sandbox",
            "hasSubscriptionKey": true,
            "hasUserId": true,
            "hasApiKey": true
        })
    );
    proxy.abort();
}

#[tokio::test]
async fn inbound_bearer_tokens_never_block_requests() {
    let upstream = MockServer::start_async().await;
    mock_token(&upstream, "tok-1", 3600).await;
    let balance_mock = upstream
        .mock_async(|when, then| {
            when.method(GET).path("/collection/v1_0/account/balance");
            then.status(200).json_body(json!({"availableBalance": "0", "currency": "EUR"}));
        })
        .await;
    let (proxy, proxy_url, _) = start_proxy(&upstream.base_url()).await;
    let client = build_reqwest_client();
    let url = format!("{}/api/balance", proxy_url);

    let known = client.get(&url).bearer_auth(CALLER_TOKEN).send().await.unwrap();
    let unknown = client.get(&url).bearer_auth("not-registered").send().await.unwrap();
    let anonymous = client.get(&url).send().await.unwrap();

    assert_eq!(known.status(), StatusCode::OK);
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(anonymous.status(), StatusCode::OK);
    assert_eq!(balance_mock.hits_async().await, 3);
    proxy.abort();
}

#[tokio::test]
async fn metrics_route_serves_prometheus_text_when_enabled() {
    let state = app_state(momo_client(UNREACHABLE_UPSTREAM)).await;
    let (proxy, proxy_url, _) = start_proxy_with(state, &settings(true)).await;
    get_metrics()
        .await
        .validation_failures
        .with_label_values(&["metrics_route_check"])
        .inc();

    let response = build_reqwest_client()
        .get(format!("{}/metrics", proxy_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = response.text().await.unwrap();
    assert!(text.contains("momoproxy_up"));
    assert!(text.contains("operation=\"metrics_route_check\""));
    proxy.abort();
}
