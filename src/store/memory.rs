//! In-Process Store
//!
//! A complete implementation of the [`Store`] contract held in memory.
//! One async mutex guards all data, so every call is atomic.
//! Expiry is lazy and uses tokio's clock, so paused-time tests can drive it.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{CellClaim, ClaimedCoin, Store, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct StringEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl StringEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct Inner {
    strings: BTreeMap<String, StringEntry>,
    sets: BTreeMap<String, BTreeSet<String>>,
    sorted_sets: BTreeMap<String, BTreeMap<String, u64>>,
    hashes: BTreeMap<String, BTreeMap<String, String>>,
}

impl Inner {
    /// Get a live string value, dropping it if it has expired.
    fn live_string(&mut self, key: &str, now: Instant) -> Option<String> {
        let live = self.strings.get(key).map(|entry| entry.is_live(now))?;
        if live {
            self.strings.get(key).map(|entry| entry.value.clone())
        } else {
            self.strings.remove(key);
            None
        }
    }

    fn purge_expired(&mut self, now: Instant) {
        self.strings.retain(|_, entry| entry.is_live(now));
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_is_member(&self, key: &str, member: &str) -> StoreResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.sets.get(key).is_some_and(|set| set.contains(member)))
    }

    async fn kv_set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.strings.insert(key.to_string(), StringEntry {
            value: value.to_string(),
            expires_at: None,
        });
        Ok(())
    }

    async fn kv_set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.strings.insert(key.to_string(), StringEntry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + ttl),
        });
        Ok(())
    }

    async fn kv_get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.live_string(key, Instant::now()))
    }

    async fn keys_by_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut inner = self.inner.lock().await;
        inner.purge_expired(Instant::now());
        Ok(inner
            .strings
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        Ok(keys.iter().map(|key| inner.live_string(key, now)).collect())
    }

    async fn sorted_set_increment(&self, key: &str, member: &str, delta: u64) -> StoreResult<u64> {
        let mut inner = self.inner.lock().await;
        let score = inner
            .sorted_sets
            .entry(key.to_string())
            .or_default()
            .entry(member.to_string())
            .or_insert(0);
        *score = score.saturating_add(delta);
        Ok(*score)
    }

    async fn sorted_set_range_desc(&self, key: &str) -> StoreResult<Vec<(String, u64)>> {
        let inner = self.inner.lock().await;
        let mut ranked: Vec<(String, u64)> = inner
            .sorted_sets
            .get(key)
            .map(|set| set.iter().map(|(m, s)| (m.clone(), *s)).collect())
            .unwrap_or_default();
        ranked.sort_by(|(m1, s1), (m2, s2)| s2.cmp(s1).then_with(|| m2.cmp(m1)));
        Ok(ranked)
    }

    async fn hash_bulk_set(&self, key: &str, entries: &[(String, String)]) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let hash = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in entries {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.hashes.get(key).and_then(|hash| hash.get(field).cloned()))
    }

    async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .hashes
            .get_mut(key)
            .is_some_and(|hash| hash.remove(field).is_some()))
    }

    async fn claim_cell(&self, claim: &CellClaim<'_>) -> StoreResult<Option<ClaimedCoin>> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let coin = match inner.hashes.get(claim.coins).and_then(|hash| hash.get(claim.cell)) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| StoreError::Corrupt {
                key: format!("{}[{}]", claim.coins, claim.cell),
                value: raw.clone(),
            })?),
            None => None,
        };

        inner.strings.insert(claim.position_key.to_string(), StringEntry {
            value: claim.position.to_string(),
            expires_at: claim.ttl.map(|ttl| Instant::now() + ttl),
        });

        let Some(value) = coin else {
            return Ok(None);
        };
        let remaining = inner.hashes.get_mut(claim.coins).map_or(0, |hash| {
            hash.remove(claim.cell);
            hash.len()
        });
        let score = inner
            .sorted_sets
            .entry(claim.scores.to_string())
            .or_default()
            .entry(claim.member.to_string())
            .or_insert(0);
        *score = score.saturating_add(value);

        Ok(Some(ClaimedCoin { value, score: *score, remaining }))
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .hashes
            .get(key)
            .map(|hash| hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn hash_len(&self, key: &str) -> StoreResult<usize> {
        let inner = self.inner.lock().await;
        Ok(inner.hashes.get(key).map_or(0, BTreeMap::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_add_reports_first_insert_only() {
        let store = MemoryStore::new();
        assert!(store.set_add("usednames", "alice").await.unwrap());
        assert!(!store.set_add("usednames", "alice").await.unwrap());
        assert!(store.set_is_member("usednames", "alice").await.unwrap());
        assert!(!store.set_is_member("usednames", "bob").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_hides_key() {
        let store = MemoryStore::new();
        store
            .kv_set_with_expiry("player:alice", "1,2", Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(store.kv_get("player:alice").await.unwrap().as_deref(), Some("1,2"));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(store.kv_get("player:alice").await.unwrap(), None);
        assert!(store.keys_by_prefix("player:").await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_set_clears_expiry() {
        let store = MemoryStore::new();
        store
            .kv_set_with_expiry("player:bob", "0,0", Duration::from_secs(1))
            .await
            .unwrap();
        store.kv_set("player:bob", "0,1").await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.kv_get("player:bob").await.unwrap().as_deref(), Some("0,1"));
    }

    #[tokio::test]
    async fn test_keys_by_prefix_and_multi_get() {
        let store = MemoryStore::new();
        store.kv_set("player:bob", "1,1").await.unwrap();
        store.kv_set("player:alice", "0,0").await.unwrap();
        store.kv_set("playerz", "x").await.unwrap();
        store.kv_set("other", "y").await.unwrap();

        let keys = store.keys_by_prefix("player:").await.unwrap();
        assert_eq!(keys, vec!["player:alice".to_string(), "player:bob".to_string()]);

        let mut wanted = keys.clone();
        wanted.push("player:nobody".to_string());
        let values = store.multi_get(&wanted).await.unwrap();
        assert_eq!(values, vec![Some("0,0".into()), Some("1,1".into()), None]);
    }

    #[tokio::test]
    async fn test_sorted_set_orders_descending() {
        let store = MemoryStore::new();
        store.sorted_set_increment("scores", "alice", 0).await.unwrap();
        store.sorted_set_increment("scores", "bob", 5).await.unwrap();
        assert_eq!(store.sorted_set_increment("scores", "alice", 10).await.unwrap(), 10);
        store.sorted_set_increment("scores", "carol", 5).await.unwrap();

        let ranked = store.sorted_set_range_desc("scores").await.unwrap();
        assert_eq!(ranked, vec![
            ("alice".to_string(), 10),
            ("carol".to_string(), 5),
            ("bob".to_string(), 5),
        ]);
        assert!(store.sorted_set_range_desc("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hash_bulk_set_merges() {
        let store = MemoryStore::new();
        store
            .hash_bulk_set("coins", &[("0,0".into(), "1".into()), ("1,0".into(), "2".into())])
            .await
            .unwrap();
        store
            .hash_bulk_set("coins", &[("1,0".into(), "5".into()), ("2,0".into(), "10".into())])
            .await
            .unwrap();

        assert_eq!(store.hash_len("coins").await.unwrap(), 3);
        assert_eq!(store.hash_get("coins", "1,0").await.unwrap().as_deref(), Some("5"));
        assert_eq!(store.hash_get_all("coins").await.unwrap().len(), 3);

        assert!(store.hash_delete("coins", "0,0").await.unwrap());
        assert!(!store.hash_delete("coins", "0,0").await.unwrap());
        assert_eq!(store.hash_len("coins").await.unwrap(), 2);
    }

    fn claim<'a>(cell: &'a str, member: &'a str, position_key: &'a str) -> CellClaim<'a> {
        CellClaim {
            coins: "coins",
            cell,
            scores: "scores",
            member,
            position_key,
            position: cell,
            ttl: None,
        }
    }

    #[tokio::test]
    async fn test_claim_cell_credits_and_moves() {
        let store = MemoryStore::new();
        store
            .hash_bulk_set("coins", &[("0,0".into(), "1".into()), ("1,0".into(), "2".into())])
            .await
            .unwrap();
        store.sorted_set_increment("scores", "alice", 3).await.unwrap();

        let claimed = store.claim_cell(&claim("1,0", "alice", "player:alice")).await.unwrap();
        assert_eq!(claimed, Some(ClaimedCoin { value: 2, score: 5, remaining: 1 }));
        assert_eq!(store.kv_get("player:alice").await.unwrap().as_deref(), Some("1,0"));
        assert_eq!(store.hash_get("coins", "1,0").await.unwrap(), None);

        // Empty cell: position only
        assert_eq!(store.claim_cell(&claim("2,0", "alice", "player:alice")).await.unwrap(), None);
        assert_eq!(store.kv_get("player:alice").await.unwrap().as_deref(), Some("2,0"));
        assert_eq!(store.sorted_set_range_desc("scores").await.unwrap(), vec![("alice".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_claim_cell_reports_last_coin() {
        let store = MemoryStore::new();
        store.hash_bulk_set("coins", &[("4,4".into(), "10".into())]).await.unwrap();

        let claimed = store.claim_cell(&claim("4,4", "bob", "player:bob")).await.unwrap();
        assert_eq!(claimed, Some(ClaimedCoin { value: 10, score: 10, remaining: 0 }));
        assert_eq!(store.hash_len("coins").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_claim_cell_with_corrupt_coin_writes_nothing() {
        let store = MemoryStore::new();
        store.hash_bulk_set("coins", &[("1,1".into(), "lots".into())]).await.unwrap();
        store.kv_set("player:eve", "0,1").await.unwrap();

        let err = store.claim_cell(&claim("1,1", "eve", "player:eve")).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(store.kv_get("player:eve").await.unwrap().as_deref(), Some("0,1"));
        assert_eq!(store.hash_len("coins").await.unwrap(), 1);
        assert!(store.sorted_set_range_desc("scores").await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_cell_applies_ttl() {
        let store = MemoryStore::new();
        let mut with_ttl = claim("0,0", "carol", "player:carol");
        with_ttl.ttl = Some(Duration::from_secs(10));
        store.claim_cell(&with_ttl).await.unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(store.kv_get("player:carol").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_single_winner() {
        let store = Arc::new(MemoryStore::new());
        store
            .hash_bulk_set("coins", &[("3,3".into(), "10".into())])
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let member = format!("p{i}");
                    let key = format!("player:p{i}");
                    store.claim_cell(&claim("3,3", &member, &key)).await.unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);

        let total: u64 = store
            .sorted_set_range_desc("scores")
            .await
            .unwrap()
            .iter()
            .map(|(_, score)| score)
            .sum();
        assert_eq!(total, 10);
        assert_eq!(store.keys_by_prefix("player:").await.unwrap().len(), 16);
    }
}
