//! Movement Directions
//!
//! Clients send single-letter directions. Anything unrecognized is ignored
//! rather than rejected, so parsing yields `Option<Direction>`.

use serde::{Serialize, Deserialize};

/// One grid step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row 0.
    #[serde(rename = "U")]
    Up,
    /// Towards the last column.
    #[serde(rename = "R")]
    Right,
    /// Towards the last row.
    #[serde(rename = "D")]
    Down,
    /// Towards column 0.
    #[serde(rename = "L")]
    Left,
}

impl Direction {
    /// All directions, clockwise from up.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Parse a wire direction (`"U"`, `"R"`, `"D"`, `"L"`).
    pub fn parse(text: &str) -> Option<Direction> {
        match text {
            "U" => Some(Direction::Up),
            "R" => Some(Direction::Right),
            "D" => Some(Direction::Down),
            "L" => Some(Direction::Left),
            _ => None,
        }
    }

    /// Wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "U",
            Direction::Right => "R",
            Direction::Down => "D",
            Direction::Left => "L",
        }
    }

    /// Unit `(dx, dy)` step.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}
