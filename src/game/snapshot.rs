//! State Snapshots
//!
//! Point-in-time view of the game for broadcast: player positions, the
//! score table (highest first) and the coin layout.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::grid::Position;

/// Read-only aggregate of the game state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Player positions, ordered by name.
    pub positions: Vec<(String, Position)>,
    /// Scores, highest first.
    pub scores: Vec<(String, u64)>,
    /// Coin values by cell.
    pub coins: BTreeMap<Position, u32>,
}

impl Snapshot {
    /// Position of a player, if tracked.
    pub fn position_of(&self, name: &str) -> Option<Position> {
        self.positions
            .iter()
            .find(|(player, _)| player == name)
            .map(|(_, pos)| *pos)
    }

    /// Score of a player, if in the ledger.
    pub fn score_of(&self, name: &str) -> Option<u64> {
        self.scores
            .iter()
            .find(|(player, _)| player == name)
            .map(|(_, score)| *score)
    }

    /// Current leader, if anyone has scored.
    pub fn leader(&self) -> Option<(&str, u64)> {
        self.scores
            .first()
            .filter(|(_, score)| *score > 0)
            .map(|(name, score)| (name.as_str(), *score))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to compact binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from compact binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}
