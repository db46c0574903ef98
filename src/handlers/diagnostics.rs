use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::helpers::time::now_rfc3339;
use crate::models::response::{ConfigSnapshot, DiagnosticsResponse, HealthResponse};
use crate::server::server::AppState;

/// Liveness only; never touches upstream or the token cache.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: now_rfc3339(),
        message: "MoMo proxy is running",
    })
}

pub async fn config_snapshot(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let momo = state.momo.config();
    Json(DiagnosticsResponse {
        success: true,
        message: "MoMo proxy configuration",
        timestamp: now_rfc3339(),
        config: ConfigSnapshot {
            base_url: momo.base_url.clone(),
            target_environment: momo.target_environment.clone(),
            has_subscription_key: momo.has_subscription_key(),
            has_user_id: momo.has_user_id(),
            has_api_key: momo.has_api_key(),
        },
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
