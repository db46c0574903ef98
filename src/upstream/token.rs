use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::AUTHORIZATION;
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::cache::token::{CachedToken, ProductLine};
use crate::helpers::time::expires_at_after;
use crate::observability::metrics::get_metrics;
use crate::upstream::client::{MomoClient, OP_TOKEN};
use crate::upstream::error::UpstreamError;
use crate::utils::constants::{HEADER_SUBSCRIPTION_KEY, HEADER_TARGET_ENVIRONMENT};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<Value>,
}

/// `Basic` credentials for the token endpoint.
pub fn basic_credentials(user_id: &str, api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user_id, api_key)))
}

impl MomoClient {
    /// Exchange the API user credentials for a bearer token. The result is
    /// not cached here.
    pub(crate) async fn fetch_token(&self, product_line: ProductLine) -> Result<CachedToken, UpstreamError> {
        let metrics = get_metrics().await;
        metrics.token_fetch_requests.with_label_values(&[product_line.as_str()]).inc();

        let fetched = self.request_token(product_line).await;
        if let Err(e) = &fetched {
            metrics
                .token_fetch_failures
                .with_label_values(&[product_line.as_str(), e.reason()])
                .inc();
            error!("Error getting {} access token: {}", product_line, e.detail());
        }
        fetched
    }

    async fn request_token(&self, product_line: ProductLine) -> Result<CachedToken, UpstreamError> {
        if !product_line.is_supported() {
            return Err(UpstreamError::UnsupportedProductLine(product_line));
        }

        let url = self.url(&[product_line.as_str(), "token", ""])?;
        let request = self
            .http
            .request(Method::POST, url)
            .header(AUTHORIZATION, basic_credentials(&self.config.user_id, &self.config.api_key))
            .header(HEADER_SUBSCRIPTION_KEY, &self.config.subscription_key)
            .header(HEADER_TARGET_ENVIRONMENT, &self.config.target_environment)
            .json(&json!({}));

        let response = self.send(OP_TOKEN, request).await?;
        let token = parse_token_response(response.data)?;
        info!("fetched {} access token, expires at {}", product_line, token.expires_at);
        Ok(token)
    }
}

fn parse_token_response(data: Value) -> Result<CachedToken, UpstreamError> {
    let parsed: TokenResponse = serde_json::from_value(data)
        .map_err(|e| UpstreamError::MalformedToken(e.to_string()))?;

    let token = parsed
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| UpstreamError::MalformedToken("missing access_token".to_owned()))?;

    let lifetime = match parsed.expires_in {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .ok_or_else(|| UpstreamError::MalformedToken("missing or invalid expires_in".to_owned()))?;

    Ok(CachedToken::new(token, expires_at_after(lifetime)))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn basic_credentials_encode_user_and_key() {
        assert_eq!(basic_credentials("user", "key"), "Basic dXNlcjprZXk=");
    }

    #[test]
    fn parses_lifetime_as_number_or_numeric_string() {
        let before = Utc::now();
        let token = parse_token_response(json!({"access_token": "abc", "token_type": "access_token", "expires_in": 3600})).unwrap();
        assert_eq!(token.token, "abc");
        assert!(token.expires_at >= before + Duration::seconds(3600));

        let token = parse_token_response(json!({"access_token": "abc", "expires_in": "60"})).unwrap();
        assert!(token.expires_at <= Utc::now() + Duration::seconds(60));
    }

    #[test]
    fn rejects_responses_without_token_or_lifetime() {
        assert!(matches!(
            parse_token_response(json!({"expires_in": 3600})),
            Err(UpstreamError::MalformedToken(_))
        ));
        assert!(matches!(
            parse_token_response(json!({"access_token": "abc"})),
            Err(UpstreamError::MalformedToken(_))
        ));
        assert!(matches!(
            parse_token_response(Value::Null),
            Err(UpstreamError::MalformedToken(_))
        ));
    }
}
