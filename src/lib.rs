//! # Coin Grid Game Server
//!
//! Authoritative game-state engine for Coin Grid: players roam a bounded
//! grid, collect coins worth 1, 2, 5 or 10 points, and every change is
//! published as a full snapshot.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    COIN GRID SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── grid.rs     - Positions, bounds, wall clamping          │
//! │  └── rng.rs      - Seeded Xoroshiro128+ PRNG, permutations   │
//! │                                                              │
//! │  store/          - Backing store contract                    │
//! │  ├── mod.rs      - Store trait, errors, key layout           │
//! │  ├── memory.rs   - In-process store                          │
//! │  └── timeout.rs  - Per-call timeout wrapper                  │
//! │                                                              │
//! │  game/           - Game logic                                │
//! │  ├── config.rs   - Tunables and value tiers                  │
//! │  ├── direction.rs- Movement directions                       │
//! │  ├── coins.rs    - Coin distribution                         │
//! │  ├── state.rs    - GameState engine                          │
//! │  ├── snapshot.rs - Broadcast snapshots                       │
//! │  └── error.rs    - Errors and admission results              │
//! │                                                              │
//! │  network/        - Session boundary (no sockets)             │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Per-connection name/move state machine    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! The engine holds no game state and takes no locks of its own. Every
//! operation is a chain of store calls; mutual exclusion comes from the
//! store's atomic primitives (set insert, hash take, score increment).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use crate::core::grid::{clamp, Grid, Position};
pub use crate::core::rng::DeterministicRng;
pub use game::{Admission, Direction, GameConfig, GameError, GameState, MoveOutcome, RejectReason, Snapshot};
pub use store::{MemoryStore, Store, StoreError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default grid width
pub const DEFAULT_WIDTH: u32 = 64;

/// Default grid height
pub const DEFAULT_HEIGHT: u32 = 64;

/// Default longest player name, in characters
pub const MAX_PLAYER_NAME_LENGTH: usize = 32;

/// Default coins per batch
pub const NUM_COINS: usize = 100;
