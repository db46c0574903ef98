use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::cache::token::ProductLine;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer; `body` is the decoded payload when there was one
    #[error("Request failed with status code {}", status.as_u16())]
    Status { status: StatusCode, body: Option<Value> },

    #[error("malformed token response: {0}")]
    MalformedToken(String),

    #[error("product line '{0}' is not supported")]
    UnsupportedProductLine(ProductLine),

    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),

    #[error("failed to obtain token: {0}")]
    TokenAcquisition(Box<UpstreamError>),
}

impl UpstreamError {
    /// Status of the proxied call itself. Token failures never report one,
    /// so callers cannot mistake a token endpoint 404 for an operation 404.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// What the caller sees under `error`: upstream body when present,
    /// otherwise the error message.
    pub fn detail(&self) -> Value {
        match self {
            UpstreamError::Status { body: Some(body), .. } => body.clone(),
            UpstreamError::TokenAcquisition(inner) => inner.detail(),
            other => Value::String(other.to_string()),
        }
    }

    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status { .. } => "status",
            UpstreamError::MalformedToken(_) => "malformed",
            UpstreamError::UnsupportedProductLine(_) => "unsupported",
            UpstreamError::InvalidUrl(_) => "url",
            UpstreamError::TokenAcquisition(_) => "token",
        }
    }
}
