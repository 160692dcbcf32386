use crate::algos::model_based::mdp::Mdp;
use gridworld::{presets, render, Cell, Direction, Layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridState {
    Cell(Cell),
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridAction {
    North,
    West,
    South,
    East,
    Exit,
}

impl GridAction {
    pub const MOVES: [GridAction; 4] = [
        GridAction::North,
        GridAction::West,
        GridAction::South,
        GridAction::East,
    ];

    pub fn direction(&self) -> Option<Direction> {
        match self {
            GridAction::North => Some(Direction::North),
            GridAction::West => Some(Direction::West),
            GridAction::South => Some(Direction::South),
            GridAction::East => Some(Direction::East),
            GridAction::Exit => None,
        }
    }

    /// The two moves a slip can turn this one into.
    fn perpendicular(&self) -> [GridAction; 2] {
        match self {
            GridAction::North | GridAction::South => [GridAction::West, GridAction::East],
            _ => [GridAction::North, GridAction::South],
        }
    }

    pub fn symbol(&self) -> char {
        self.direction().map_or('x', render::arrow)
    }
}

/// Noisy gridworld: a move goes where intended with probability `1 - noise`
/// and slips to either perpendicular direction with `noise / 2`. Moving into
/// a wall or off the grid stays put. Exit cells only allow `Exit`, which
/// pays the cell's reward and ends the episode; every other step pays
/// `living_reward`.
#[derive(Debug, Clone)]
pub struct GridMdp {
    layout: Layout,
    noise: f64,
    living_reward: f64,
}

impl GridMdp {
    pub fn new(layout: Layout, noise: f64, living_reward: f64) -> Self {
        Self {
            layout,
            noise,
            living_reward,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    pub fn living_reward(&self) -> f64 {
        self.living_reward
    }

    pub fn start_state(&self) -> Option<GridState> {
        self.layout.start().map(GridState::Cell)
    }

    fn moved(&self, cell: Cell, a: GridAction) -> GridState {
        let next = a.direction().map_or(cell, |d| d.successor(cell));
        GridState::Cell(if self.layout.is_open(next) { next } else { cell })
    }

    /// Renders the symbol of `policy` for every cell; `.` where it has none.
    pub fn policy_text<F>(&self, policy: F) -> String
    where
        F: Fn(&GridState) -> Option<GridAction>,
    {
        render::grid_text(&self.layout, |c| {
            policy(&GridState::Cell(c))
                .map_or('.', |a| a.symbol())
                .to_string()
        })
    }
}

impl Mdp for GridMdp {
    type State = GridState;
    type Action = GridAction;

    fn states(&self) -> Vec<GridState> {
        self.layout
            .open_cells()
            .into_iter()
            .map(GridState::Cell)
            .chain(std::iter::once(GridState::Terminal))
            .collect()
    }

    fn actions(&self, s: &GridState) -> Vec<GridAction> {
        match s {
            GridState::Terminal => vec![],
            GridState::Cell(c) if self.layout.exit_reward(*c).is_some() => vec![GridAction::Exit],
            GridState::Cell(_) => GridAction::MOVES.to_vec(),
        }
    }

    fn transitions(&self, s: &GridState, a: &GridAction) -> Vec<(GridState, f64)> {
        let cell = match s {
            GridState::Terminal => return vec![],
            GridState::Cell(c) => *c,
        };

        if self.layout.exit_reward(cell).is_some() {
            return match a {
                GridAction::Exit => vec![(GridState::Terminal, 1.)],
                _ => vec![],
            };
        }
        if *a == GridAction::Exit {
            return vec![];
        }

        let [left, right] = a.perpendicular();
        let outcomes = [
            (self.moved(cell, *a), 1. - self.noise),
            (self.moved(cell, left), self.noise / 2.),
            (self.moved(cell, right), self.noise / 2.),
        ];

        let mut merged: Vec<(GridState, f64)> = Vec::with_capacity(3);
        for (next, p) in outcomes {
            match merged.iter_mut().find(|(s, _)| *s == next) {
                Some((_, q)) => *q += p,
                None => merged.push((next, p)),
            }
        }

        merged
    }

    fn reward(&self, s: &GridState, _a: &GridAction, _next: &GridState) -> f64 {
        match s {
            GridState::Terminal => 0.,
            GridState::Cell(c) => self.layout.exit_reward(*c).unwrap_or(self.living_reward),
        }
    }

    fn is_terminal(&self, s: &GridState) -> bool {
        *s == GridState::Terminal
    }
}

/// Parameters that make value iteration on a preset grid show a particular
/// behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub name: &'static str,
    pub grid: &'static str,
    pub discount: f64,
    pub noise: f64,
    pub living_reward: f64,
}

impl Tuning {
    pub fn mdp(&self) -> Option<GridMdp> {
        let layout = presets::layout(self.grid)?.ok()?;
        Some(GridMdp::new(layout, self.noise, self.living_reward))
    }
}

pub static TUNINGS: [Tuning; 6] = [
    Tuning {
        name: "bridge-crossing",
        grid: "BridgeGrid",
        discount: 0.9,
        noise: 0.001,
        living_reward: 0.,
    },
    Tuning {
        name: "close-exit-risk-cliff",
        grid: "DiscountGrid",
        discount: 0.9,
        noise: 0.2,
        living_reward: -2.,
    },
    Tuning {
        name: "close-exit-avoid-cliff",
        grid: "DiscountGrid",
        discount: 0.3,
        noise: 0.2,
        living_reward: 0.,
    },
    Tuning {
        name: "distant-exit-risk-cliff",
        grid: "DiscountGrid",
        discount: 0.9,
        noise: 0.05,
        living_reward: -2.,
    },
    Tuning {
        name: "distant-exit-avoid-cliff",
        grid: "DiscountGrid",
        discount: 0.9,
        noise: 0.2,
        living_reward: 0.,
    },
    Tuning {
        name: "avoid-all-exits",
        grid: "DiscountGrid",
        discount: 0.9,
        noise: 0.1,
        living_reward: 20.,
    },
];

pub fn tuning(name: &str) -> Option<&'static Tuning> {
    TUNINGS.iter().find(|t| t.name == name)
}
