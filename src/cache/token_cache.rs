use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::cache::token::{CachedToken, ProductLine};
use crate::helpers::time::now;
use crate::observability::metrics::get_metrics;

/// Bearer tokens per product line.
///
/// Created empty, filled lazily on first use, entries are overwritten on
/// refresh. Refreshes are serialized per product line so that concurrent
/// callers observing an empty or expired entry share a single upstream fetch.
#[derive(Debug, Clone)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<ProductLine, CachedToken>>>,
    refresh_guards: Arc<HashMap<ProductLine, Arc<Mutex<()>>>>,
    safety_margin_seconds: u64,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TokenCache {
    pub fn new(safety_margin_seconds: u64) -> Self {
        let refresh_guards = ProductLine::ALL
            .iter()
            .map(|product_line| (*product_line, Arc::new(Mutex::new(()))))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            refresh_guards: Arc::new(refresh_guards),
            safety_margin_seconds,
        }
    }

    /// Overwrite the entry for a product line
    pub async fn set(&self, product_line: ProductLine, token: CachedToken) {
        get_metrics()
            .await
            .token_expiry_unix
            .with_label_values(&[product_line.as_str()])
            .set(token.expires_at.timestamp());
        let mut map = self.inner.write().await;
        map.insert(product_line, token);
    }

    /// Get token if it exists and is not expired
    pub async fn get(&self, product_line: ProductLine) -> Option<CachedToken> {
        let map = self.inner.read().await;
        map.get(&product_line)
            .filter(|token| token.is_valid_at(now(), self.safety_margin_seconds))
            .cloned()
    }

    /// Raw entry, expired or not.
    pub async fn peek(&self, product_line: ProductLine) -> Option<CachedToken> {
        self.inner.read().await.get(&product_line).cloned()
    }

    /// Returns a valid token for `product_line`, running `fetch` when the
    /// cache holds none. `fetch` runs at most once per call and its failure
    /// leaves the cache untouched.
    pub async fn get_or_refresh<F, Fut, E>(&self, product_line: ProductLine, fetch: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedToken, E>>,
    {
        let metrics = get_metrics().await;

        if let Some(cached) = self.get(product_line).await {
            debug!("token cache hit for '{}'", product_line);
            metrics.token_cache_hits.with_label_values(&[product_line.as_str()]).inc();
            return Ok(cached.token);
        }

        let guard = self.refresh_guard(product_line);
        let _refreshing = guard.lock().await;

        // another caller may have refreshed while we waited
        if let Some(cached) = self.get(product_line).await {
            debug!("token for '{}' refreshed by a concurrent caller", product_line);
            metrics.token_cache_hits.with_label_values(&[product_line.as_str()]).inc();
            return Ok(cached.token);
        }

        info!("token for '{}' is absent or expired, fetching", product_line);
        let fresh = fetch().await?;
        let token = fresh.token.clone();
        info!("token for '{}' cached until {}", product_line, fresh.expires_at);
        self.set(product_line, fresh).await;
        Ok(token)
    }

    fn refresh_guard(&self, product_line: ProductLine) -> Arc<Mutex<()>> {
        self.refresh_guards
            .get(&product_line)
            .cloned()
            .unwrap_or_else(|| Arc::new(Mutex::new(())))
    }
}
