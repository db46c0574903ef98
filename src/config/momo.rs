use serde::Deserialize;
use std::collections::HashMap;

use crate::utils::constants::{DEFAULT_MOMO_BASE_URL, DEFAULT_TARGET_ENVIRONMENT};

/// ================================
/// Upstream MoMo credentials
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct MomoConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub subscription_key: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_target_environment")]
    pub target_environment: String,
}

impl MomoConfig {
    pub fn has_subscription_key(&self) -> bool {
        !self.subscription_key.is_empty()
    }

    pub fn has_user_id(&self) -> bool {
        !self.user_id.is_empty()
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// ================================
/// Inbound callers
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InboundAuthConfig {
    /// bearer token -> caller name
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

fn default_base_url() -> String {
    DEFAULT_MOMO_BASE_URL.to_owned()
}

fn default_target_environment() -> String {
    DEFAULT_TARGET_ENVIRONMENT.to_owned()
}
