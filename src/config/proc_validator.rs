//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Hard errors: server bind, logging level, metrics path, upstream base url
//! - Missing upstream credentials are only warned about: health and
//!   diagnostics endpoints must keep working without them

use reqwest::Url;
use tracing::{error, info, warn};

use crate::config::momo::{InboundAuthConfig, MomoConfig};
use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::RESERVED_ROUTES;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_momo(&cfg.momo, &mut errors);
    validate_inbound_auth(&cfg.inbound_auth, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    // safety margin sane bounds
    if let Some(s) = settings.safety_margin_seconds {
        if s > 60 * 60 * 24 {
            errors.push(format!(
                "settings.safety_margin_seconds ({}) is unreasonably large",
                s
            ));
        }
    }

    if let Some(0) = settings.upstream_timeout_ms {
        errors.push("settings.upstream_timeout_ms must be greater than 0".to_owned());
    }

    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/' and must not shadow the api
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.is_enabled && RESERVED_ROUTES.contains(&metrics.path.as_str()) {
        errors.push(format!(
            "settings.metrics.path '{}' collides with a proxy route",
            metrics.path
        ));
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

/// UPSTREAM VALIDATION
fn validate_momo(momo: &MomoConfig, errors: &mut Vec<String>) {
    match Url::parse(&momo.base_url) {
        Ok(url) if url.cannot_be_a_base() => errors.push(format!(
            "momo.base_url '{}' cannot be used as a base url",
            momo.base_url
        )),
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => errors.push(format!(
            "momo.base_url '{}' must use http or https",
            momo.base_url
        )),
        Ok(_) => {}
        Err(e) => errors.push(format!("momo.base_url '{}' is invalid: {}", momo.base_url, e)),
    }

    if momo.target_environment.trim().is_empty() {
        errors.push("momo.target_environment must not be empty".to_owned());
    }

    if !momo.has_subscription_key() {
        warn!("momo.subscription_key is empty; upstream calls will be rejected");
    }
    if !momo.has_user_id() || !momo.has_api_key() {
        warn!("momo.user_id or momo.api_key is empty; token requests will fail");
    }
}

fn validate_inbound_auth(inbound: &InboundAuthConfig, errors: &mut Vec<String>) {
    for (token, caller) in &inbound.tokens {
        if token.trim().is_empty() {
            errors.push(format!("inbound_auth.tokens: empty token for caller '{}'", caller));
        }
        if caller.trim().is_empty() {
            errors.push("inbound_auth.tokens: caller name must not be empty".to_owned());
        }
    }
}
