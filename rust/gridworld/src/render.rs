//! Plain text rendering of per-cell quantities, top row first.

use crate::{Cell, Direction, Layout};
use itertools::Itertools;

/// Renders `f(cell)` for every open cell and `#` for walls, right aligned
/// in columns of equal width.
pub fn grid_text<F>(layout: &Layout, f: F) -> String
where
    F: Fn(Cell) -> String,
{
    let rows = (0..layout.height() as i32)
        .rev()
        .map(|y| {
            (0..layout.width() as i32)
                .map(|x| {
                    let c = Cell::new(x, y);
                    if layout.is_open(c) {
                        f(c)
                    } else {
                        "#".to_string()
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let width = rows.iter().flatten().map(|s| s.len()).max().unwrap_or(0);
    rows.iter()
        .map(|r| r.iter().map(|s| format!("{s:>width$}")).join(" "))
        .join("\n")
}

pub fn values_text<F>(layout: &Layout, value: F) -> String
where
    F: Fn(Cell) -> f64,
{
    grid_text(layout, |c| format!("{:.2}", value(c)))
}

pub fn arrow(d: Direction) -> char {
    match d {
        Direction::North => '^',
        Direction::South => 'v',
        Direction::East => '>',
        Direction::West => '<',
        Direction::Stop => '.',
    }
}
