use crate::tracking::PursuitView;
use gridworld::{Cell, Direction, Layout};
use std::rc::Rc;
use tracing::info;

/// A pursuer walking a layout while hidden targets sit on fixed cells.
/// Landing on a live target's cell captures it.
#[derive(Debug, Clone)]
pub struct GridView {
    layout: Rc<Layout>,
    pursuer: Cell,
    targets: Vec<Cell>,
    living: Vec<bool>,
}

impl GridView {
    pub fn new(layout: Rc<Layout>, pursuer: Cell, targets: Vec<Cell>) -> Self {
        let living = vec![true; targets.len()];
        let mut view = Self {
            layout,
            pursuer,
            targets,
            living,
        };
        view.capture_at_pursuer();
        view
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn targets(&self) -> &[Cell] {
        &self.targets
    }

    /// Whether every target has been captured.
    pub fn is_cleared(&self) -> bool {
        self.living.iter().all(|alive| !alive)
    }

    pub fn captured(&self) -> usize {
        self.living.iter().filter(|alive| !**alive).count()
    }

    /// Plays `d` if legal, otherwise stays put. Returns the number of
    /// targets captured by the move.
    pub fn apply(&mut self, d: Direction) -> usize {
        let next = d.successor(self.pursuer);
        if self.layout.is_open(next) {
            self.pursuer = next;
        }
        self.capture_at_pursuer()
    }

    /// Marks target `i` as captured. Returns whether it was still alive.
    pub fn capture(&mut self, i: usize) -> bool {
        match self.living.get_mut(i) {
            Some(alive) if *alive => {
                *alive = false;
                info!(index = i, at = %self.targets[i], "target captured");
                true
            }
            _ => false,
        }
    }

    fn capture_at_pursuer(&mut self) -> usize {
        let hits = self
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == self.pursuer)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        hits.into_iter().filter(|i| self.capture(*i)).count()
    }
}

impl PursuitView for GridView {
    type Position = Cell;
    type Move = Direction;

    fn pursuer_position(&self) -> Cell {
        self.pursuer
    }

    fn legal_moves(&self) -> Vec<Direction> {
        self.layout.legal_moves(self.pursuer)
    }

    fn living_targets(&self) -> Vec<bool> {
        self.living.clone()
    }
}
