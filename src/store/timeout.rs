//! Per-Call Timeouts
//!
//! Wraps any [`Store`] so that no call can suspend forever.
//! An expired call surfaces as [`StoreError::Timeout`], which is retryable.

use std::future::Future;
use std::time::Duration;

use super::{CellClaim, ClaimedCoin, Store, StoreError, StoreResult};

/// Store wrapper bounding every call by a fixed timeout.
#[derive(Debug)]
pub struct TimedStore<S> {
    inner: S,
    limit: Duration,
}

impl<S: Store> TimedStore<S> {
    /// Wrap `inner`, bounding each call by `limit`.
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Configured per-call limit.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, limit = ?self.limit, "store call timed out");
                Err(StoreError::Timeout { operation, after: self.limit })
            }
        }
    }
}

impl<S: Store> Store for TimedStore<S> {
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.bounded("set_add", self.inner.set_add(key, member)).await
    }

    async fn set_is_member(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.bounded("set_is_member", self.inner.set_is_member(key, member)).await
    }

    async fn kv_set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.bounded("kv_set", self.inner.kv_set(key, value)).await
    }

    async fn kv_set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.bounded("kv_set_with_expiry", self.inner.kv_set_with_expiry(key, value, ttl)).await
    }

    async fn kv_get(&self, key: &str) -> StoreResult<Option<String>> {
        self.bounded("kv_get", self.inner.kv_get(key)).await
    }

    async fn keys_by_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.bounded("keys_by_prefix", self.inner.keys_by_prefix(prefix)).await
    }

    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        self.bounded("multi_get", self.inner.multi_get(keys)).await
    }

    async fn sorted_set_increment(&self, key: &str, member: &str, delta: u64) -> StoreResult<u64> {
        self.bounded("sorted_set_increment", self.inner.sorted_set_increment(key, member, delta)).await
    }

    async fn sorted_set_range_desc(&self, key: &str) -> StoreResult<Vec<(String, u64)>> {
        self.bounded("sorted_set_range_desc", self.inner.sorted_set_range_desc(key)).await
    }

    async fn hash_bulk_set(&self, key: &str, entries: &[(String, String)]) -> StoreResult<()> {
        self.bounded("hash_bulk_set", self.inner.hash_bulk_set(key, entries)).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.bounded("hash_get", self.inner.hash_get(key, field)).await
    }

    async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.bounded("hash_delete", self.inner.hash_delete(key, field)).await
    }

    async fn claim_cell(&self, claim: &CellClaim<'_>) -> StoreResult<Option<ClaimedCoin>> {
        self.bounded("claim_cell", self.inner.claim_cell(claim)).await
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        self.bounded("hash_get_all", self.inner.hash_get_all(key)).await
    }

    async fn hash_len(&self, key: &str) -> StoreResult<usize> {
        self.bounded("hash_len", self.inner.hash_len(key)).await
    }
}
