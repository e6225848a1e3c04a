//! Game Logic Module
//!
//! ## Module Structure
//!
//! - `config`: Tunables, value tiers, environment loading
//! - `direction`: Movement directions
//! - `coins`: Coin distribution
//! - `state`: The GameState engine
//! - `snapshot`: Broadcast snapshots
//! - `error`: Engine errors and admission results

pub mod config;
pub mod direction;
pub mod coins;
pub mod state;
pub mod snapshot;
pub mod error;

// Re-export key types
pub use config::{GameConfig, ValueTiers, ConfigError};
pub use direction::Direction;
pub use coins::{CoinDistributor, CoinLayout};
pub use state::{GameState, MoveOutcome};
pub use snapshot::Snapshot;
pub use error::{Admission, GameError, RejectReason};
