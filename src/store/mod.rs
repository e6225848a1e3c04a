//! Store Contract
//!
//! The game keeps no state of its own. Everything lives in an external
//! transactional store exposing key/value, set, sorted-set and hash
//! primitives in the style of Redis. Every method is a suspension point.
//!
//! ## Key Layout
//!
//! | key             | type       | contents                         |
//! |-----------------|------------|----------------------------------|
//! | `player:<name>` | string     | `"x,y"` position, optional TTL   |
//! | `scores`        | sorted set | player name -> cumulative score  |
//! | `coins`         | hash       | `"x,y"` -> coin value            |
//! | `usednames`     | set        | every name ever registered       |

use std::future::Future;
use std::time::Duration;

pub mod memory;
pub mod timeout;

#[cfg(test)]
pub(crate) mod testing;

pub use memory::MemoryStore;
pub use timeout::TimedStore;

/// Store key names.
pub mod keys {
    /// Sorted set of player scores.
    pub const SCORES: &str = "scores";
    /// Hash of coin cells to coin values.
    pub const COINS: &str = "coins";
    /// Set of every name ever registered.
    pub const USED_NAMES: &str = "usednames";
    /// Prefix of per-player position keys.
    pub const PLAYER_PREFIX: &str = "player:";

    /// Position key for a player.
    pub fn player(name: &str) -> String {
        format!("{PLAYER_PREFIX}{name}")
    }

    /// Recover the player name from a position key.
    pub fn player_name(key: &str) -> Option<&str> {
        key.strip_prefix(PLAYER_PREFIX)
    }
}

/// Result alias for store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Call did not complete in time.
    #[error("store call {operation} timed out after {after:?}")]
    Timeout {
        /// Store operation name.
        operation: &'static str,
        /// Configured limit.
        after: Duration,
    },

    /// Store could not be reached or refused the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored value could not be decoded.
    #[error("corrupt value {value:?} under key {key}")]
    Corrupt {
        /// Key (and field, for hashes) holding the value.
        key: String,
        /// Raw stored value.
        value: String,
    },
}

impl StoreError {
    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout { .. } | StoreError::Unavailable(_))
    }
}

/// A player stepping onto a cell, settled by [`Store::claim_cell`].
#[derive(Debug, Clone, Copy)]
pub struct CellClaim<'a> {
    /// Coin hash key.
    pub coins: &'a str,
    /// Target cell field in the coin hash.
    pub cell: &'a str,
    /// Score sorted-set key.
    pub scores: &'a str,
    /// Member credited with the coin.
    pub member: &'a str,
    /// Position key written for the player.
    pub position_key: &'a str,
    /// Position value written for the player.
    pub position: &'a str,
    /// Expiry of the position key. `None` clears any expiry.
    pub ttl: Option<Duration>,
}

/// Coin credited by [`Store::claim_cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimedCoin {
    /// Value of the coin.
    pub value: u64,
    /// Member score after the credit.
    pub score: u64,
    /// Number of coins left after removal.
    pub remaining: usize,
}

/// Operations the engine needs from the backing store.
///
/// Each call must be atomic on its own. The engine composes them and relies
/// on `set_add`, `claim_cell` and `sorted_set_increment` for mutual exclusion.
pub trait Store: Send + Sync {
    /// Add `member` to a set. Returns `true` if it was not already present.
    /// The membership check and insert are one atomic step.
    fn set_add(&self, key: &str, member: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Check set membership.
    fn set_is_member(&self, key: &str, member: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Set a string value, clearing any expiry.
    fn kv_set(&self, key: &str, value: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Set a string value that expires after `ttl`.
    fn kv_set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Get a string value.
    fn kv_get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// List live string keys starting with `prefix`, in key order.
    fn keys_by_prefix(&self, prefix: &str) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// Get several string values at once. The result is parallel to `keys`.
    fn multi_get(&self, keys: &[String]) -> impl Future<Output = StoreResult<Vec<Option<String>>>> + Send;

    /// Atomically add `delta` to a member's score, creating it at 0 first.
    /// Returns the new score.
    fn sorted_set_increment(
        &self,
        key: &str,
        member: &str,
        delta: u64,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// All members with scores, highest score first. Ties are ordered by
    /// member, descending.
    fn sorted_set_range_desc(&self, key: &str) -> impl Future<Output = StoreResult<Vec<(String, u64)>>> + Send;

    /// Merge fields into a hash, overwriting existing fields. Never clears
    /// fields that are not in `entries`.
    fn hash_bulk_set(
        &self,
        key: &str,
        entries: &[(String, String)],
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Get one hash field.
    fn hash_get(&self, key: &str, field: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Delete one hash field. Returns `true` if it existed.
    fn hash_delete(&self, key: &str, field: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Settle a move as one atomic unit: write the position and, if the cell
    /// holds a coin, remove it and credit its value to the member. When
    /// several callers race for the same coin, at most one is credited.
    ///
    /// A coin value that does not parse is [`StoreError::Corrupt`] and
    /// nothing is written. On any error nothing is written.
    fn claim_cell(&self, claim: &CellClaim<'_>) -> impl Future<Output = StoreResult<Option<ClaimedCoin>>> + Send;

    /// All fields of a hash, in field order.
    fn hash_get_all(&self, key: &str) -> impl Future<Output = StoreResult<Vec<(String, String)>>> + Send;

    /// Number of fields in a hash.
    fn hash_len(&self, key: &str) -> impl Future<Output = StoreResult<usize>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_key_round_trip() {
        let key = keys::player("alice");
        assert_eq!(key, "player:alice");
        assert_eq!(keys::player_name(&key), Some("alice"));
        assert_eq!(keys::player_name("scores"), None);
    }

    #[test]
    fn test_retryable_errors() {
        let timeout = StoreError::Timeout {
            operation: "kv_get",
            after: Duration::from_millis(10),
        };
        assert!(timeout.is_retryable());
        assert!(StoreError::Unavailable("down".into()).is_retryable());
        assert!(!StoreError::Corrupt { key: "coins".into(), value: "x".into() }.is_retryable());
    }
}
