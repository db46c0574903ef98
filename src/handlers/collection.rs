//! Proxied Collections operations: validate, obtain a token, forward,
//! normalize.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use http::StatusCode;
use tracing::info;
use uuid::Uuid;

use crate::auth::identity::Caller;
use crate::error::ApiError;
use crate::models::payment::{
    validate_reference_id, AccountHolder, AccountHolderBody, PaymentRequest, RequestToPayBody,
    ValidationError,
};
use crate::models::response::ApiResponse;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;
use crate::upstream::client::{
    OP_ACCOUNT_HOLDER_ACTIVE, OP_ACCOUNT_HOLDER_INFO, OP_REQUEST_TO_PAY,
    OP_TRANSACTION_STATUS,
};

const REQUEST_TO_PAY_FAILED: &str = "Failed to initiate payment request";
const TRANSACTION_STATUS_FAILED: &str = "Failed to get transaction status";
const ACCOUNT_BALANCE_FAILED: &str = "Failed to get account balance";
const ACCOUNT_HOLDER_INFO_FAILED: &str = "Failed to get account holder info";
const VALIDATE_ACCOUNT_FAILED: &str = "Failed to validate account holder";

type ApiResult = Result<Json<ApiResponse>, ApiError>;

pub async fn request_to_pay(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<RequestToPayBody>, JsonRejection>,
) -> ApiResult {
    let payment = validated(OP_REQUEST_TO_PAY, payload, PaymentRequest::try_from).await?;
    let reference_id = Uuid::new_v4();
    info!(
        "request to pay {} {} for external id '{}' from {}, reference {}",
        payment.amount, payment.currency, payment.external_id, caller.subject(), reference_id
    );

    let response = state
        .momo
        .request_to_pay(reference_id, &payment)
        .await
        .map_err(|e| ApiError::upstream(REQUEST_TO_PAY_FAILED, e))?;

    Ok(Json(ApiResponse::payment_initiated(reference_id.to_string(), response.data)))
}

pub async fn transaction_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(reference_id): Path<String>,
) -> ApiResult {
    let reference_id = reject_invalid(OP_TRANSACTION_STATUS, validate_reference_id(&reference_id)).await?;
    info!("transaction status for {} from {}", reference_id, caller.subject());

    let response = state
        .momo
        .transaction_status(reference_id)
        .await
        .map_err(|e| ApiError::upstream(TRANSACTION_STATUS_FAILED, e))?;

    Ok(Json(ApiResponse::data(response.data)))
}

pub async fn account_balance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult {
    info!("account balance from {}", caller.subject());

    let response = state
        .momo
        .account_balance()
        .await
        .map_err(|e| ApiError::upstream(ACCOUNT_BALANCE_FAILED, e))?;

    Ok(Json(ApiResponse::data(response.data)))
}

pub async fn account_holder_info(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<AccountHolderBody>, JsonRejection>,
) -> ApiResult {
    let holder = validated(OP_ACCOUNT_HOLDER_INFO, payload, AccountHolder::try_from).await?;
    info!("account holder info for {}/{} from {}", holder.id_type, holder.id, caller.subject());

    let response = state
        .momo
        .account_holder_info(&holder)
        .await
        .map_err(|e| ApiError::upstream(ACCOUNT_HOLDER_INFO_FAILED, e))?;

    Ok(Json(ApiResponse::data(response.data)))
}

/// Upstream 404 means the holder is unknown or inactive, not a failure.
pub async fn validate_account(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<AccountHolderBody>, JsonRejection>,
) -> ApiResult {
    let holder = validated(OP_ACCOUNT_HOLDER_ACTIVE, payload, AccountHolder::try_from).await?;
    info!("validate account {}/{} from {}", holder.id_type, holder.id, caller.subject());

    match state.momo.account_holder_active(&holder).await {
        Ok(response) => Ok(Json(ApiResponse::account_status(
            response.status == StatusCode::OK,
            response.data,
        ))),
        Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
            info!("account holder {}/{} not found or inactive", holder.id_type, holder.id);
            Ok(Json(ApiResponse::account_inactive()))
        }
        Err(e) => Err(ApiError::upstream(VALIDATE_ACCOUNT_FAILED, e)),
    }
}

/// A body sent without a JSON content type is read as an empty object, so
/// the caller gets the operation's missing-fields message.
async fn validated<B: Default, T>(
    operation: &'static str,
    payload: Result<Json<B>, JsonRejection>,
    validate: impl FnOnce(B) -> Result<T, ValidationError>,
) -> Result<T, ApiError> {
    let outcome = match payload {
        Ok(Json(body)) => validate(body).map_err(ApiError::from),
        Err(JsonRejection::MissingJsonContentType(_)) => validate(B::default()).map_err(ApiError::from),
        Err(rejection) => Err(ApiError::from(rejection)),
    };
    reject_invalid(operation, outcome).await
}

async fn reject_invalid<T, E: Into<ApiError>>(operation: &'static str, outcome: Result<T, E>) -> Result<T, ApiError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(e) => {
            let e: ApiError = e.into();
            info!("rejected {} request: {}", operation, e);
            get_metrics()
                .await
                .validation_failures
                .with_label_values(&[operation])
                .inc();
            Err(e)
        }
    }
}
