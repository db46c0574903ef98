use serde::Deserialize;

use crate::config::momo::{InboundAuthConfig, MomoConfig};
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub momo: MomoConfig,
    #[serde(default)]
    pub inbound_auth: InboundAuthConfig,
}
