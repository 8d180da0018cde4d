//! Rate limit counter storage.
//!
//! # Data Flow
//! ```text
//! RateLimiter
//!     → CounterStore::sweep (local map only, inline before each check)
//!     → CounterStore::get (current count for rl:{ip}:{scope}:{window})
//!     → CounterStore::put (count + 1, TTL slightly longer than the window)
//! ```
//!
//! # Design Decisions
//! - Exactly one store is active per process, chosen from static config
//! - Keys partition by window index, so rollover needs no explicit reset
//! - get/put is read-then-write: concurrent requests may both read the
//!   same count and write the same increment. Those lost updates make the
//!   stored count lag the admitted requests, so a burst can over-admit
//! - Stores that age entries themselves use the limiter's clock (`now_ms`),
//!   never their own

pub mod kv;
pub mod local;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::EdgeConfig;

pub use kv::KvCounterStore;
pub use local::LocalCounterStore;

/// Errors from a counter store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned status {0}")]
    Status(u16),
    #[error("store value {0:?} is not a count")]
    Corrupt(String),
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
}

/// Key to hit-count storage used by the rate limiter.
#[async_trait]
pub trait CounterStore: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Current count for `key`, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError>;

    /// Store `count` for `key`, expiring after `ttl`. `now_ms` is the
    /// limiter's clock, the same one later passed to `sweep`.
    async fn put(
        &self,
        key: &str,
        count: u64,
        ttl: Duration,
        now_ms: u64,
    ) -> Result<(), StoreError>;

    /// Drop entries created more than `max_age_ms` before `now_ms`.
    /// Backends with native TTL do nothing.
    fn sweep(&self, _now_ms: u64, _max_age_ms: u64) {}
}

/// Select the counter store for this deployment.
///
/// A durable store requested without an endpoint degrades to the local map.
pub fn build_store(config: &EdgeConfig) -> Arc<dyn CounterStore> {
    if config.rate_limit.use_durable_store {
        match config.durable_store.url.as_deref() {
            Some(url) => match KvCounterStore::new(url, &config.durable_store) {
                Ok(store) => {
                    tracing::info!(url = %url, "Using durable counter store");
                    return Arc::new(store);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Durable store unavailable, using local counters");
                }
            },
            None => {
                tracing::warn!("Durable store enabled without durable_store.url, using local counters");
            }
        }
    }
    Arc::new(LocalCounterStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_store_defaults_to_local() {
        assert_eq!(build_store(&EdgeConfig::default()).name(), "local");
    }

    #[test]
    fn test_build_store_degrades_without_url() {
        let mut config = EdgeConfig::default();
        config.rate_limit.use_durable_store = true;
        assert_eq!(build_store(&config).name(), "local");
    }

    #[test]
    fn test_build_store_durable() {
        let mut config = EdgeConfig::default();
        config.rate_limit.use_durable_store = true;
        config.durable_store.url = Some("http://127.0.0.1:7777/kv".into());
        assert_eq!(build_store(&config).name(), "kv");
    }
}
