use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::auth::identity::{resolve_caller, CallerResolver, StaticTokenResolver};
use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::error::ApiError;
use crate::handlers::{collection, diagnostics};
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;
use crate::upstream::MomoClient;
use crate::utils::constants::{
    ROUTE_ACCOUNT_HOLDER, ROUTE_BALANCE, ROUTE_HEALTH, ROUTE_REQUEST_TO_PAY, ROUTE_TEST,
    ROUTE_TRANSACTION, ROUTE_VALIDATE_ACCOUNT,
};

#[derive(Clone)]
pub struct AppState {
    pub momo: MomoClient,
    pub callers: Arc<dyn CallerResolver>,
    pub metrics_state: MetricsState,
}

impl AppState {
    /// Metrics route serves the process-wide registry.
    pub async fn new(momo: MomoClient, callers: Arc<dyn CallerResolver>) -> Self {
        let metrics = get_metrics().await;
        Self {
            momo,
            callers,
            metrics_state: MetricsState::new(metrics.registry.clone()),
        }
    }

    /// Wire the upstream client, token cache and caller resolver from config.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        let momo = MomoClient::from_settings(service_config.momo.clone(), &service_config.settings)?;
        let callers = Arc::new(StaticTokenResolver::new(service_config.inbound_auth.tokens.clone()));

        Ok(Self::new(momo, callers).await)
    }
}

/// Every proxy route plus the optional metrics route; anything else,
/// including a known path with the wrong method, answers 404.
pub fn router(state: AppState, settings_config: &SettingsConfig) -> Router {
    Router::new()
        .route(ROUTE_HEALTH, get(diagnostics::health).fallback(diagnostics::not_found))
        .route(ROUTE_TEST, get(diagnostics::config_snapshot).fallback(diagnostics::not_found))
        .route(ROUTE_REQUEST_TO_PAY, post(collection::request_to_pay).fallback(diagnostics::not_found))
        .route(ROUTE_TRANSACTION, get(collection::transaction_status).fallback(diagnostics::not_found))
        .route(ROUTE_BALANCE, get(collection::account_balance).fallback(diagnostics::not_found))
        .route(ROUTE_ACCOUNT_HOLDER, post(collection::account_holder_info).fallback(diagnostics::not_found))
        .route(ROUTE_VALIDATE_ACCOUNT, post(collection::validate_account).fallback(diagnostics::not_found))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .fallback(diagnostics::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_caller))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start(
    settings_config: &SettingsConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = router(state, settings_config);
    let bind_addr = settings_config.server.bind_addr();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);

    let metrics = get_metrics().await;
    metrics.up.set(1);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error");
    metrics.up.set(0);

    served
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Unhandled error: {}", detail);
    ApiError::Internal.into_response()
}

#[cfg(test)]
mod test {
    use super::*;
    use http::StatusCode;

    #[tokio::test]
    async fn panics_become_the_generic_error_envelope() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "message": "Internal server error"}));
    }
}
