pub mod grid_mdp;
pub mod grid_view;

use crate::algos::pursuit::DistanceOracle;
use gridworld::{Cell, Distancer};

impl DistanceOracle<Cell> for Distancer {
    fn distance(&self, a: &Cell, b: &Cell) -> f64 {
        self.get(*a, *b).map_or(f64::INFINITY, |d| d as f64)
    }
}
