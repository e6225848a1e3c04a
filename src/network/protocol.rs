//! Protocol Messages
//!
//! Wire format between clients and the session layer.
//! Messages are JSON objects tagged by `type`.

use serde::{Serialize, Deserialize};

use crate::game::error::RejectReason;
use crate::game::snapshot::Snapshot;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask to join under a name.
    Name {
        /// Requested name (trimmed by the server).
        name: String,
    },

    /// Move one cell. Kept as raw text: unknown directions are ignored,
    /// not rejected.
    Move {
        /// `"U"`, `"R"`, `"D"` or `"L"`.
        direction: String,
    },
}

impl ClientMessage {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Name accepted; the client may now send moves.
    Welcome,

    /// Name refused; the client may try another.
    BadName {
        /// The refused (trimmed) name.
        name: String,
        /// Why it was refused.
        reason: RejectReason,
    },

    /// Full game state.
    State(Snapshot),
}

impl ServerMessage {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
