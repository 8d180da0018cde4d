//! Process-local counter store.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CounterStore, StoreError};

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u64,
    created_ms: u64,
}

/// Instance-scoped counters in a concurrent map, bounded by `sweep`.
#[derive(Debug, Default)]
pub struct LocalCounterStore {
    entries: DashMap<String, CounterEntry>,
}

impl LocalCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CounterStore for LocalCounterStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.count))
    }

    // TTL is enforced by `sweep`; the window index in the key already
    // stops stale entries from being read as current.
    async fn put(
        &self,
        key: &str,
        count: u64,
        _ttl: Duration,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        self.entries
            .entry(key.to_string())
            .and_modify(|entry| entry.count = count)
            .or_insert(CounterEntry {
                count,
                created_ms: now_ms,
            });
        Ok(())
    }

    fn sweep(&self, now_ms: u64, max_age_ms: u64) {
        let cutoff = now_ms.saturating_sub(max_age_ms);
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.created_ms > cutoff);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "Swept local counters");
        }
    }
}
