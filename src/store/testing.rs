//! Fault injection for store-dependent tests.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use super::{CellClaim, ClaimedCoin, MemoryStore, Store, StoreError, StoreResult};

/// [`MemoryStore`] that can be told to fail or hang on chosen operations.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    failing: Mutex<BTreeSet<&'static str>>,
    stalled: Mutex<BTreeSet<&'static str>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` return [`StoreError::Unavailable`].
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    /// Make `operation` never complete.
    pub fn stall(&self, operation: &'static str) {
        self.stalled.lock().unwrap().insert(operation);
    }

    /// Clear all injected faults.
    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
        self.stalled.lock().unwrap().clear();
    }

    async fn check(&self, operation: &'static str) -> StoreResult<()> {
        let stalled = self.stalled.lock().unwrap().contains(operation);
        if stalled {
            std::future::pending::<()>().await;
        }
        if self.failing.lock().unwrap().contains(operation) {
            return Err(StoreError::Unavailable(format!("{operation} injected failure")));
        }
        Ok(())
    }
}

impl Store for FaultyStore {
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.check("set_add").await?;
        self.inner.set_add(key, member).await
    }

    async fn set_is_member(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.check("set_is_member").await?;
        self.inner.set_is_member(key, member).await
    }

    async fn kv_set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check("kv_set").await?;
        self.inner.kv_set(key, value).await
    }

    async fn kv_set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.check("kv_set_with_expiry").await?;
        self.inner.kv_set_with_expiry(key, value, ttl).await
    }

    async fn kv_get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check("kv_get").await?;
        self.inner.kv_get(key).await
    }

    async fn keys_by_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.check("keys_by_prefix").await?;
        self.inner.keys_by_prefix(prefix).await
    }

    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        self.check("multi_get").await?;
        self.inner.multi_get(keys).await
    }

    async fn sorted_set_increment(&self, key: &str, member: &str, delta: u64) -> StoreResult<u64> {
        self.check("sorted_set_increment").await?;
        self.inner.sorted_set_increment(key, member, delta).await
    }

    async fn sorted_set_range_desc(&self, key: &str) -> StoreResult<Vec<(String, u64)>> {
        self.check("sorted_set_range_desc").await?;
        self.inner.sorted_set_range_desc(key).await
    }

    async fn hash_bulk_set(&self, key: &str, entries: &[(String, String)]) -> StoreResult<()> {
        self.check("hash_bulk_set").await?;
        self.inner.hash_bulk_set(key, entries).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.check("hash_get").await?;
        self.inner.hash_get(key, field).await
    }

    async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.check("hash_delete").await?;
        self.inner.hash_delete(key, field).await
    }

    async fn claim_cell(&self, claim: &CellClaim<'_>) -> StoreResult<Option<ClaimedCoin>> {
        self.check("claim_cell").await?;
        self.inner.claim_cell(claim).await
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        self.check("hash_get_all").await?;
        self.inner.hash_get_all(key).await
    }

    async fn hash_len(&self, key: &str) -> StoreResult<usize> {
        self.check("hash_len").await?;
        self.inner.hash_len(key).await
    }
}
