use serde::Serialize;
use serde_json::Value;

pub const PAYMENT_INITIATED: &str = "Payment request initiated successfully";
pub const ACCOUNT_INACTIVE: &str = "Account holder not found or inactive";

/// Success envelope shared by every proxied operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn data(data: Value) -> Self {
        Self {
            success: true,
            reference_id: None,
            message: None,
            is_active: None,
            data: Some(data),
        }
    }

    pub fn payment_initiated(reference_id: String, data: Value) -> Self {
        Self {
            reference_id: Some(reference_id),
            message: Some(PAYMENT_INITIATED.to_owned()),
            ..Self::data(data)
        }
    }

    pub fn account_status(is_active: bool, data: Value) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::data(data)
        }
    }

    pub fn account_inactive() -> Self {
        Self {
            success: true,
            reference_id: None,
            message: Some(ACCOUNT_INACTIVE.to_owned()),
            is_active: Some(false),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub message: &'static str,
}

/// Non-secret view of the upstream configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub base_url: String,
    pub target_environment: String,
    pub has_subscription_key: bool,
    pub has_user_id: bool,
    pub has_api_key: bool,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticsResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
    pub config: ConfigSnapshot,
}
