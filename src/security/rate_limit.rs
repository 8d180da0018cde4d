//! Fixed-window rate limiting per client IP and path scope.
//!
//! ```text
//! window   = floor(now_ms / window_ms)
//! key      = rl:{ip}:{scope}:{window}
//! count >= limit          → Denied (429)
//! count <  limit          → put(count + 1, ttl = window + grace) → Allowed
//! store error             → Allowed without headers (fail open)
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::store::{CounterStore, StoreError};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Quota headers attached to an allowed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch milliseconds of the next window boundary.
    pub reset_ms: u64,
}

impl RateLimitHeaders {
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(self.reset_ms));
    }
}

/// The request may proceed. `headers` is `None` when the path is not
/// limited or the store failed open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowed {
    pub headers: Option<RateLimitHeaders>,
}

/// The request exceeded its window quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denied {
    pub limit: u64,
    pub reset_ms: u64,
    pub retry_after_secs: u64,
}

impl IntoResponse for Denied {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "rate_limit_exceeded",
            "message": format!(
                "Too many requests, retry in {} seconds.",
                self.retry_after_secs
            ),
        });

        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(self.retry_after_secs));
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u64));
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(self.reset_ms));
        response
    }
}

enum Decision {
    Allow(RateLimitHeaders),
    Deny(Denied),
}

/// Fixed-window limiter over an injected counter store.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    enabled: bool,
    max_requests: u64,
    window_ms: u64,
    ttl: Duration,
    path_prefixes: Vec<String>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, store: Arc<dyn CounterStore>) -> Self {
        let window_secs = config.window_secs.max(1);
        Self {
            store,
            enabled: config.enabled,
            max_requests: config.max_requests,
            window_ms: window_secs * 1000,
            ttl: Duration::from_secs(window_secs + config.ttl_grace_secs),
            path_prefixes: config.path_prefixes.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    /// Counter scope for `path`, `None` when the path is not limited.
    ///
    /// The matched prefix is the scope, so every item under a prefix shares
    /// one counter. With no prefixes configured each path is its own scope.
    pub fn scope<'a>(&'a self, path: &'a str) -> Option<&'a str> {
        if !self.enabled {
            return None;
        }
        if self.path_prefixes.is_empty() {
            return Some(path);
        }
        self.path_prefixes
            .iter()
            .find(|prefix| path.starts_with(prefix.as_str()))
            .map(String::as_str)
    }

    /// Metric label for a scope. Per-path scopes collapse into `"all"` so
    /// clients cannot mint new series by varying the path.
    pub fn metric_scope<'a>(&self, scope: &'a str) -> &'a str {
        if self.path_prefixes.is_empty() {
            "all"
        } else {
            scope
        }
    }

    /// Check and count a request at the current time.
    pub async fn check(&self, client_ip: &str, path: &str) -> Result<Allowed, Denied> {
        self.check_at(client_ip, path, now_ms()).await
    }

    /// Check and count a request at `now_ms` (epoch milliseconds).
    pub async fn check_at(&self, client_ip: &str, path: &str, now_ms: u64) -> Result<Allowed, Denied> {
        let Some(scope) = self.scope(path) else {
            return Ok(Allowed { headers: None });
        };

        match self.evaluate(client_ip, scope, now_ms).await {
            Ok(Decision::Allow(headers)) => Ok(Allowed {
                headers: Some(headers),
            }),
            Ok(Decision::Deny(denied)) => {
                tracing::warn!(client = %client_ip, scope = %scope, "Rate limit exceeded");
                metrics::record_rate_limited(self.metric_scope(scope));
                Err(denied)
            }
            // Fail open: the only place a store fault turns into a decision.
            Err(e) => {
                tracing::warn!(
                    client = %client_ip,
                    scope = %scope,
                    store = self.store.name(),
                    error = %e,
                    "Counter store failed, allowing request"
                );
                metrics::record_store_error(self.store.name());
                Ok(Allowed { headers: None })
            }
        }
    }

    async fn evaluate(&self, client_ip: &str, scope: &str, now_ms: u64) -> Result<Decision, StoreError> {
        self.store.sweep(now_ms, self.window_ms * 2);

        let window = now_ms / self.window_ms;
        let reset_ms = (window + 1) * self.window_ms;
        let key = format!("rl:{client_ip}:{scope}:{window}");

        let count = self.store.get(&key).await?.unwrap_or(0);
        if count >= self.max_requests {
            let retry_after_secs = (reset_ms - now_ms).div_ceil(1000).max(1);
            return Ok(Decision::Deny(Denied {
                limit: self.max_requests,
                reset_ms,
                retry_after_secs,
            }));
        }

        let count = count + 1;
        self.store.put(&key, count, self.ttl, now_ms).await?;

        Ok(Decision::Allow(RateLimitHeaders {
            limit: self.max_requests,
            remaining: self.max_requests - count,
            reset_ms,
        }))
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
