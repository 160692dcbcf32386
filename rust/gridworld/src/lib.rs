extern crate itertools;
extern crate serde;
extern crate thiserror;

pub mod common;
pub mod distancer;
pub mod layout;
pub mod presets;
pub mod render;

pub use common::defs::*;
pub use distancer::Distancer;
pub use layout::{Layout, LayoutError, Tile};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid position. `x` grows towards East, `y` towards North.
///
/// Cells order lexicographically on `(x, y)`, which is the order every
/// map keyed by `Cell` iterates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, ignoring walls.
    pub fn manhattan(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    /// Moves that change position, in the order legal moves are enumerated.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn vector(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }

    /// Position reached by applying this move to `cell`. Walls are not
    /// consulted; callers only apply legal moves.
    pub fn successor(&self, cell: Cell) -> Cell {
        let (dx, dy) = self.vector();
        Cell::new(cell.x + dx, cell.y + dy)
    }

    pub fn reverse(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
            Direction::Stop => "Stop",
        };
        f.write_str(s)
    }
}
