use crate::{Cell, Direction};
use itertools::iproduct;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tile {
    Wall,
    Open,
    /// A cell whose only action leaves the grid, collecting the reward.
    Exit(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} has {found} tokens, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unrecognised token '{token}' at row {row}, column {col}")]
    UnknownToken {
        token: String,
        row: usize,
        col: usize,
    },

    #[error("more than one start cell: {first} and {second}")]
    DuplicateStart { first: Cell, second: Cell },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// A rectangular grid of tiles.
///
/// Text layouts list rows top-down with whitespace separated tokens:
/// `#` wall, `_` open, `S` start (open), any finite number an exit
/// paying that reward. The first text row becomes `y = height - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    start: Option<Cell>,
}

impl Layout {
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|r| r.as_ref().split_whitespace().collect::<Vec<_>>())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>();

        let height = rows.len();
        let width = rows.first().map(|r| r.len()).ok_or(LayoutError::Empty)?;

        let mut tiles = vec![Tile::Wall; width * height];
        let mut start: Option<Cell> = None;
        for (row, tokens) in rows.iter().enumerate() {
            if tokens.len() != width {
                return Err(LayoutError::Ragged {
                    row,
                    found: tokens.len(),
                    expected: width,
                });
            }

            let y = (height - 1 - row) as i32;
            for (col, token) in tokens.iter().enumerate() {
                let cell = Cell::new(col as i32, y);
                let tile = match *token {
                    "#" => Tile::Wall,
                    "_" => Tile::Open,
                    "S" => {
                        if let Some(first) = start {
                            return Err(LayoutError::DuplicateStart {
                                first,
                                second: cell,
                            });
                        }
                        start = Some(cell);
                        Tile::Open
                    }
                    t => match t.parse::<f64>() {
                        Ok(r) if r.is_finite() => Tile::Exit(r),
                        _ => {
                            return Err(LayoutError::UnknownToken {
                                token: t.to_string(),
                                row,
                                col,
                            })
                        }
                    },
                };
                tiles[y as usize * width + col] = tile;
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
            start,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    /// `None` outside the grid.
    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.tiles[y * self.width + x])
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        matches!(self.tile(cell), Some(Tile::Open) | Some(Tile::Exit(_)))
    }

    pub fn exit_reward(&self, cell: Cell) -> Option<f64> {
        match self.tile(cell) {
            Some(Tile::Exit(r)) => Some(r),
            _ => None,
        }
    }

    /// All non-wall cells in `(x, y)` order.
    pub fn open_cells(&self) -> Vec<Cell> {
        iproduct!(0..self.width as i32, 0..self.height as i32)
            .map(|(x, y)| Cell::new(x, y))
            .filter(|&c| self.is_open(c))
            .collect()
    }

    /// Open cells reachable from `cell` in one cardinal move.
    pub fn neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Direction::CARDINALS
            .into_iter()
            .map(move |d| d.successor(cell))
            .filter(|&n| self.is_open(n))
    }

    /// Cardinal moves into open cells followed by `Stop`.
    pub fn legal_moves(&self, cell: Cell) -> Vec<Direction> {
        Direction::CARDINALS
            .into_iter()
            .filter(|d| self.is_open(d.successor(cell)))
            .chain(std::iter::once(Direction::Stop))
            .collect()
    }

    /// Open `width` x `height` grid without walls or exits.
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Open; width * height],
            start: None,
        }
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_rows(&s.lines().collect::<Vec<_>>())
    }
}
