use crate::config::service::ServiceConfig;
use crate::config::settings::LoggingConfig;
use crate::utils::constants::DEFAULT_TARGET_ENVIRONMENT;

pub fn initiate_default_values(mut config: ServiceConfig) -> ServiceConfig {
    if config.settings.logging.is_none() {
        config.settings.logging = Some(LoggingConfig::default());
    }

    // upstream paths are appended with a leading '/'
    let base_url = config.momo.base_url.trim().trim_end_matches('/').to_owned();
    config.momo.base_url = base_url;

    // an unset env placeholder expands to an empty string
    if config.momo.target_environment.trim().is_empty() {
        config.momo.target_environment = DEFAULT_TARGET_ENVIRONMENT.to_owned();
    }

    config.momo.subscription_key = config.momo.subscription_key.trim().to_owned();
    config.momo.user_id = config.momo.user_id.trim().to_owned();
    config.momo.api_key = config.momo.api_key.trim().to_owned();

    config
}
