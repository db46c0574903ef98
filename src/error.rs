use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use thiserror::Error;

use crate::models::payment::ValidationError;
use crate::models::response::ErrorResponse;
use crate::upstream::UpstreamError;

pub const NOT_FOUND_MESSAGE: &str = "Endpoint not found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Everything a handler can answer with besides success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error("Endpoint not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn upstream(message: &'static str, source: UpstreamError) -> Self {
        ApiError::Upstream { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.0.to_owned())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(message) => ErrorResponse { success: false, message, error: None },
            ApiError::Upstream { message, source } => ErrorResponse {
                success: false,
                message: message.to_owned(),
                error: Some(source.detail()),
            },
            ApiError::NotFound => ErrorResponse {
                success: false,
                message: NOT_FOUND_MESSAGE.to_owned(),
                error: None,
            },
            ApiError::Internal => ErrorResponse {
                success: false,
                message: INTERNAL_ERROR_MESSAGE.to_owned(),
                error: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
