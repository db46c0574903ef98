use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use http::{Method, StatusCode};
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, error};
use uuid::Uuid;

use crate::cache::token::ProductLine;
use crate::cache::token_cache::TokenCache;
use crate::config::momo::MomoConfig;
use crate::config::settings::SettingsConfig;
use crate::models::payment::{AccountHolder, PaymentRequest};
use crate::observability::metrics::get_metrics;
use crate::upstream::error::UpstreamError;
use crate::utils::constants::{HEADER_REFERENCE_ID, HEADER_SUBSCRIPTION_KEY, HEADER_TARGET_ENVIRONMENT};

pub const OP_REQUEST_TO_PAY: &str = "request_to_pay";
pub const OP_TRANSACTION_STATUS: &str = "transaction_status";
pub const OP_ACCOUNT_BALANCE: &str = "account_balance";
pub const OP_ACCOUNT_HOLDER_INFO: &str = "account_holder_info";
pub const OP_ACCOUNT_HOLDER_ACTIVE: &str = "account_holder_active";
pub(crate) const OP_TOKEN: &str = "token";

/// Successful upstream answer. An empty body decodes to `null`, a body that
/// is not JSON is kept as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub data: Value,
}

/// MoMo Collections client. Owns the token cache; every collection call
/// goes through [`MomoClient::access_token`] first.
#[derive(Debug, Clone)]
pub struct MomoClient {
    pub(crate) http: Client,
    pub(crate) config: Arc<MomoConfig>,
    pub(crate) tokens: TokenCache,
}

impl MomoClient {
    pub fn new(config: MomoConfig, http: Client, tokens: TokenCache) -> Self {
        Self { http, config: Arc::new(config), tokens }
    }

    /// Build the client with the transport settings from the service config.
    pub fn from_settings(config: MomoConfig, settings: &SettingsConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = settings.upstream_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder.build().context("failed to build upstream HTTP client")?;
        let tokens = TokenCache::new(settings.safety_margin_seconds.unwrap_or(0));
        Ok(Self::new(config, http, tokens))
    }

    pub fn config(&self) -> &MomoConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Valid bearer token for `product_line`, from cache or freshly fetched.
    pub async fn access_token(&self, product_line: ProductLine) -> Result<String, UpstreamError> {
        if !product_line.is_supported() {
            return Err(UpstreamError::TokenAcquisition(Box::new(
                UpstreamError::UnsupportedProductLine(product_line),
            )));
        }

        self.tokens
            .get_or_refresh(product_line, || self.fetch_token(product_line))
            .await
            .map_err(|e| UpstreamError::TokenAcquisition(Box::new(e)))
    }

    pub async fn request_to_pay(
        &self,
        reference_id: Uuid,
        payment: &PaymentRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let token = self.access_token(ProductLine::Collection).await?;
        let url = self.url(&["collection", "v1_0", "requesttopay"])?;
        let request = self
            .collection_request(Method::POST, url, &token)
            .header(HEADER_REFERENCE_ID, reference_id.to_string())
            .json(payment);
        self.send(OP_REQUEST_TO_PAY, request).await
    }

    pub async fn transaction_status(&self, reference_id: &str) -> Result<UpstreamResponse, UpstreamError> {
        let token = self.access_token(ProductLine::Collection).await?;
        let url = self.url(&["collection", "v1_0", "requesttopay", reference_id])?;
        self.send(OP_TRANSACTION_STATUS, self.collection_request(Method::GET, url, &token))
            .await
    }

    pub async fn account_balance(&self) -> Result<UpstreamResponse, UpstreamError> {
        let token = self.access_token(ProductLine::Collection).await?;
        let url = self.url(&["collection", "v1_0", "account", "balance"])?;
        self.send(OP_ACCOUNT_BALANCE, self.collection_request(Method::GET, url, &token))
            .await
    }

    pub async fn account_holder_info(&self, holder: &AccountHolder) -> Result<UpstreamResponse, UpstreamError> {
        self.account_holder(OP_ACCOUNT_HOLDER_INFO, holder, "basicuserinfo").await
    }

    pub async fn account_holder_active(&self, holder: &AccountHolder) -> Result<UpstreamResponse, UpstreamError> {
        self.account_holder(OP_ACCOUNT_HOLDER_ACTIVE, holder, "active").await
    }

    async fn account_holder(
        &self,
        operation: &'static str,
        holder: &AccountHolder,
        resource: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let token = self.access_token(ProductLine::Collection).await?;
        let url = self.url(&[
            "collection",
            "v1_0",
            "accountholder",
            holder.id_type.as_str(),
            holder.id.as_str(),
            resource,
        ])?;
        self.send(operation, self.collection_request(Method::GET, url, &token))
            .await
    }

    /// `base_url` joined with percent-encoded path segments.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn collection_request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token)
            .header(HEADER_TARGET_ENVIRONMENT, &self.config.target_environment)
            .header(HEADER_SUBSCRIPTION_KEY, &self.config.subscription_key)
    }

    /// Send one request, record it, and turn non-2xx answers into errors.
    pub(crate) async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let metrics = get_metrics().await;
        let start = Instant::now();

        let outcome = match request.send().await {
            Ok(response) => read_response(response).await,
            Err(e) => Err(UpstreamError::Transport(e)),
        };

        metrics
            .upstream_duration
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        let status_label = match &outcome {
            Ok(response) => response.status.as_u16().to_string(),
            Err(e) => e
                .status()
                .map(|status| status.as_u16().to_string())
                .unwrap_or_else(|| e.reason().to_owned()),
        };
        metrics
            .upstream_requests
            .with_label_values(&[operation, status_label.as_str()])
            .inc();

        match &outcome {
            Ok(response) => debug!("upstream {} answered {}", operation, response.status),
            Err(e) => error!("upstream {} failed: {}", operation, e.detail()),
        }
        outcome
    }
}

async fn read_response(response: reqwest::Response) -> Result<UpstreamResponse, UpstreamError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let body = decode_body(&bytes);

    if status.is_success() {
        Ok(UpstreamResponse { status, data: body.unwrap_or(Value::Null) })
    } else {
        Err(UpstreamError::Status { status, body })
    }
}

fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
    )
}
