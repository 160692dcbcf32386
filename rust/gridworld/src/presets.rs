//! Named layouts from the classic gridworld exercises.

use crate::layout::{Layout, Result};

pub const BOOK_GRID: &[&str] = &[
    "_ _ _ 1", //
    "_ # _ -1",
    "S _ _ _",
];

pub const BRIDGE_GRID: &[&str] = &[
    "# -100 -100 -100 -100 -100 #",
    "1 S _ _ _ _ 10",
    "# -100 -100 -100 -100 -100 #",
];

pub const CLIFF_GRID: &[&str] = &[
    "_ _ _ _ _",
    "S _ _ _ 10",
    "-100 -100 -100 -100 -100",
];

pub const DISCOUNT_GRID: &[&str] = &[
    "_ _ _ _ _",
    "_ # _ _ _",
    "_ # 1 # 10",
    "S _ _ _ _",
    "-10 -10 -10 -10 -10",
];

pub const MAZE_GRID: &[&str] = &[
    "_ _ _ 1", //
    "# # _ #",
    "_ # _ _",
    "_ # # _",
    "S _ _ _",
];

pub const NAMES: [&str; 5] = [
    "BookGrid",
    "BridgeGrid",
    "CliffGrid",
    "DiscountGrid",
    "MazeGrid",
];

/// Rows of the preset called `name`, if there is one.
pub fn rows(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "BookGrid" => Some(BOOK_GRID),
        "BridgeGrid" => Some(BRIDGE_GRID),
        "CliffGrid" => Some(CLIFF_GRID),
        "DiscountGrid" => Some(DISCOUNT_GRID),
        "MazeGrid" => Some(MAZE_GRID),
        _ => None,
    }
}

pub fn layout(name: &str) -> Option<Result<Layout>> {
    rows(name).map(|r| Layout::from_rows(r))
}
