use crate::{Cell, Layout};
use std::collections::{HashMap, VecDeque};

/// All-pairs maze distances over the open cells of a layout.
///
/// Distances are shortest path lengths using cardinal moves, so walls make
/// cells that are close on the plane far apart in the maze.
#[derive(Debug, Clone)]
pub struct Distancer {
    distances: HashMap<(Cell, Cell), u32>,
}

impl Distancer {
    pub fn new(layout: &Layout) -> Self {
        let mut distances = HashMap::new();
        for source in layout.open_cells() {
            for (target, d) in bfs(layout, source) {
                distances.insert((source, target), d);
            }
        }

        Self { distances }
    }

    /// `None` if either cell is a wall, off the grid, or unreachable.
    pub fn get(&self, a: Cell, b: Cell) -> Option<u32> {
        self.distances.get(&(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

fn bfs(layout: &Layout, source: Cell) -> HashMap<Cell, u32> {
    let mut seen = HashMap::from([(source, 0)]);
    let mut queue = VecDeque::from([source]);
    while let Some(c) = queue.pop_front() {
        let d = seen[&c];
        for n in layout.neighbours(c) {
            if !seen.contains_key(&n) {
                seen.insert(n, d + 1);
                queue.push_back(n);
            }
        }
    }

    seen
}
