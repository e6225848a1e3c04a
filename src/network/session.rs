//! Player Session
//!
//! Per-connection state machine between a client and the [`GameState`].
//! A connection first negotiates a name, then plays. The session never
//! touches sockets: it returns [`Outbound`] messages and the transport
//! decides how to deliver them. Every accepted name and every move yields
//! a fresh state broadcast.

use tracing::debug;

use crate::game::error::{Admission, GameError};
use crate::game::state::GameState;
use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::store::Store;

/// Message addressed by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Send only to this connection.
    Reply(ServerMessage),
    /// Send to every connection.
    Broadcast(ServerMessage),
}

/// Session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Only `name` messages are accepted.
    AwaitingName,
    /// Only `move` messages are accepted.
    Playing {
        /// Registered player name.
        name: String,
    },
}

/// One client's session.
#[derive(Debug)]
pub struct PlayerSession {
    state: SessionState,
}

impl Default for PlayerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerSession {
    /// Create a session waiting for a name.
    pub fn new() -> Self {
        Self { state: SessionState::AwaitingName }
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Registered name, once accepted.
    pub fn name(&self) -> Option<&str> {
        match &self.state {
            SessionState::Playing { name } => Some(name),
            SessionState::AwaitingName => None,
        }
    }

    /// Handle a raw JSON frame. Malformed frames are dropped.
    pub async fn handle_text<S: Store>(
        &mut self,
        game: &GameState<S>,
        text: &str,
    ) -> Result<Vec<Outbound>, GameError> {
        match ClientMessage::from_json(text) {
            Ok(message) => self.handle(game, message).await,
            Err(e) => {
                debug!("Invalid message: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Handle one client message.
    pub async fn handle<S: Store>(
        &mut self,
        game: &GameState<S>,
        message: ClientMessage,
    ) -> Result<Vec<Outbound>, GameError> {
        match (self.state.clone(), message) {
            (SessionState::AwaitingName, ClientMessage::Name { name }) => {
                let name = name.trim().to_string();
                match game.add_player(&name).await? {
                    Admission::Accepted => {
                        // The name is reserved now; keep it even if the snapshot fails
                        self.state = SessionState::Playing { name };
                        let snapshot = game.snapshot().await?;
                        Ok(vec![
                            Outbound::Reply(ServerMessage::Welcome),
                            Outbound::Broadcast(ServerMessage::State(snapshot)),
                        ])
                    }
                    Admission::Rejected(reason) => {
                        Ok(vec![Outbound::Reply(ServerMessage::BadName { name, reason })])
                    }
                }
            }
            (SessionState::Playing { name }, ClientMessage::Move { direction }) => {
                game.move_player(&direction, &name).await?;
                let snapshot = game.snapshot().await?;
                Ok(vec![Outbound::Broadcast(ServerMessage::State(snapshot))])
            }
            (state, message) => {
                debug!(?state, ?message, "message not valid in this state");
                Ok(Vec::new())
            }
        }
    }
}
