//! Durable counter store backed by a REST key-value namespace.
//!
//! # Protocol
//! ```text
//! GET {base}/values/{key}                         → 200 "<count>" | 404
//! PUT {base}/values/{key}?expiration_ttl={secs}   body "<count>"
//! ```
//!
//! Keys are percent-encoded as a single path segment. Expiry is native to
//! the store, so `sweep` is a no-op here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{CounterStore, StoreError};
use crate::config::DurableStoreConfig;

/// Cross-instance counters in a remote key-value store.
#[derive(Debug, Clone)]
pub struct KvCounterStore {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl KvCounterStore {
    pub fn new(base_url: &str, config: &DurableStoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| StoreError::InvalidUrl(base_url.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    fn value_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("values")
            .push(key);
        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl CounterStore for KvCounterStore {
    fn name(&self) -> &'static str {
        "kv"
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let url = self.value_url(key)?;
        let res = self.authorize(self.client.get(url)).send().await?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let text = res.text().await?;
                let value = text.trim();
                value
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| StoreError::Corrupt(value.to_string()))
            }
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn put(
        &self,
        key: &str,
        count: u64,
        ttl: Duration,
        _now_ms: u64,
    ) -> Result<(), StoreError> {
        let mut url = self.value_url(key)?;
        url.query_pairs_mut()
            .append_pair("expiration_ttl", &ttl.as_secs().max(1).to_string());

        let res = self
            .authorize(self.client.put(url))
            .body(count.to_string())
            .send()
            .await?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Status(res.status().as_u16()))
        }
    }
}
