//! Core primitives.
//!
//! Grid geometry and the seeded random source used for spawn points and
//! coin layouts.

pub mod grid;
pub mod rng;

// Re-export core types
pub use grid::{clamp, Grid, Position};
pub use rng::DeterministicRng;
