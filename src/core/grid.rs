//! Grid Geometry
//!
//! Integer positions on a bounded grid with hard walls.
//! Positions travel through the store and over the wire as `"x,y"` text.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Serializer, Deserialize, Deserializer};

use super::rng::DeterministicRng;

/// Clamp `value` into `[low, high]`.
///
/// Unlike [`Ord::clamp`] this never panics: when `low > high` the lower
/// bound wins, matching `max(low, min(high, value))`.
#[inline]
pub fn clamp<T: Ord>(value: T, low: T, high: T) -> T {
    std::cmp::max(low, std::cmp::min(high, value))
}

/// A cell on the grid. `x` is the column, `y` the row (row 0 is the top).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error parsing `"x,y"` position text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed position {0:?}, expected \"x,y\"")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParsePositionError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(malformed)?;
        let x = x.trim().parse().map_err(|_| malformed())?;
        let y = y.trim().parse().map_err(|_| malformed())?;
        Ok(Self { x, y })
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable grid bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Grid {
    /// Create grid bounds.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if position lies within the grid.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Move `pos` by `delta`, clamping each axis independently against the
    /// walls. There is no wraparound.
    pub fn step(&self, pos: Position, delta: (i32, i32)) -> Position {
        let max_x = i64::from(self.width.saturating_sub(1));
        let max_y = i64::from(self.height.saturating_sub(1));
        let x = clamp(i64::from(pos.x) + i64::from(delta.0), 0, max_x);
        let y = clamp(i64::from(pos.y) + i64::from(delta.1), 0, max_y);
        // Both values are within [0, u32::MAX) after clamping
        Position::new(x as u32, y as u32)
    }

    /// Map a cell index in `[0, cell_count)` to its position (row-major).
    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width.max(1) as usize;
        Position::new((index % width) as u32, (index / width) as u32)
    }

    /// Pick a uniformly random cell.
    pub fn random_point(&self, rng: &mut DeterministicRng) -> Position {
        let x = rng.next_below(u64::from(self.width)) as u32;
        let y = rng.next_below(u64::from(self.height)) as u32;
        Position::new(x, y)
    }
}
