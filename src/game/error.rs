//! Engine Errors and Admission Results
//!
//! Validation and name conflicts are ordinary results, not errors.
//! Only store failures and a broken coin invariant surface as [`GameError`].

use serde::{Serialize, Deserialize};

use crate::store::StoreError;

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Store call failed; propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The coin collection is empty and could not be repopulated.
    #[error("coin collection left empty after {attempts} refill attempts: {source}")]
    InvariantViolation {
        /// Refill attempts made.
        attempts: u32,
        /// Last store failure.
        #[source]
        source: StoreError,
    },
}

impl GameError {
    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            GameError::Store(err) => err.is_retryable(),
            GameError::InvariantViolation { .. } => false,
        }
    }
}

/// Why a name was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Empty name.
    Empty,
    /// Name longer than the limit.
    TooLong {
        /// Name length in characters.
        len: usize,
        /// Configured limit.
        max: usize,
    },
    /// Name was registered before.
    Taken,
}

/// Outcome of a registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// Player registered.
    Accepted,
    /// Player refused.
    Rejected(RejectReason),
}

impl Admission {
    /// Whether the player was registered.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }
}
