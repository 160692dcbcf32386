//! An agent that keeps beliefs about hidden targets up to date and hands
//! them to a pluggable control source each tick.

use crate::algos::pursuit::{most_likely_position, Belief, DistanceOracle, GreedyPursuit, PursuitTick};
use std::collections::VecDeque;
use std::fmt::Debug;
use tracing::{debug, trace};

/// What the pursuer can see of the game each tick.
pub trait PursuitView {
    type Position: Ord + Clone + Debug;

    type Move: Clone + PartialEq + Debug;

    fn pursuer_position(&self) -> Self::Position;

    fn legal_moves(&self) -> Vec<Self::Move>;

    /// One flag per tracked target, in the order the inference modules were
    /// given to the agent.
    fn living_targets(&self) -> Vec<bool>;
}

/// Source of one target's belief distribution. Filtering itself happens
/// elsewhere; the agent only drives the calls.
pub trait InferenceModule<V: PursuitView> {
    fn initialize(&mut self, view: &V);

    /// Advances the belief by one time step.
    fn elapse_time(&mut self, view: &V);

    fn observe(&mut self, view: &V);

    fn belief(&self) -> Belief<V::Position>;
}

/// Receives refreshed beliefs, e.g. to draw them.
pub trait BeliefDisplay<P> {
    fn update_distributions(&mut self, beliefs: &[Belief<P>]);
}

/// Decides the pursuer's move from the view and the current beliefs.
pub trait ControlSource<V: PursuitView> {
    fn choose_action(&mut self, view: &V, beliefs: &[Belief<V::Position>]) -> V::Move;
}

/// Belief that never changes.
#[derive(Debug, Clone)]
pub struct StaticBelief<P> {
    belief: Belief<P>,
}

impl<P: Ord> StaticBelief<P> {
    pub fn new(belief: Belief<P>) -> Self {
        Self { belief }
    }

    /// All mass on `p`.
    pub fn point(p: P) -> Self {
        Self::new(Belief::from([(p, 1.)]))
    }
}

impl<V: PursuitView> InferenceModule<V> for StaticBelief<V::Position> {
    fn initialize(&mut self, _view: &V) {}

    fn elapse_time(&mut self, _view: &V) {}

    fn observe(&mut self, _view: &V) {}

    fn belief(&self) -> Belief<V::Position> {
        self.belief.clone()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl<P> BeliefDisplay<P> for NullDisplay {
    fn update_distributions(&mut self, _beliefs: &[Belief<P>]) {}
}

/// Logs each target's most likely position at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDisplay;

impl<P: Debug> BeliefDisplay<P> for TracingDisplay {
    fn update_distributions(&mut self, beliefs: &[Belief<P>]) {
        for (i, b) in beliefs.iter().enumerate() {
            trace!(index = i, most_likely = ?most_likely_position(b), support = b.len(), "belief");
        }
    }
}

/// Always plays the same move, typically stopping in place.
#[derive(Debug, Clone)]
pub struct Stationary<M>(pub M);

impl<V: PursuitView> ControlSource<V> for Stationary<V::Move> {
    fn choose_action(&mut self, _view: &V, _beliefs: &[Belief<V::Position>]) -> V::Move {
        self.0.clone()
    }
}

/// Plays queued moves in order, as a keyboard would. An illegal queued move
/// is dropped and `idle` is played instead; so is an empty queue.
#[derive(Debug, Clone)]
pub struct Scripted<M> {
    moves: VecDeque<M>,
    idle: M,
}

impl<M> Scripted<M> {
    pub fn new<I: IntoIterator<Item = M>>(moves: I, idle: M) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            idle,
        }
    }

    pub fn push(&mut self, m: M) {
        self.moves.push_back(m);
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl<V: PursuitView> ControlSource<V> for Scripted<V::Move> {
    fn choose_action(&mut self, view: &V, _beliefs: &[Belief<V::Position>]) -> V::Move {
        match self.moves.pop_front() {
            Some(m) if view.legal_moves().contains(&m) => m,
            Some(m) => {
                debug!(?m, "dropping illegal scripted move");
                self.idle.clone()
            }
            None => self.idle.clone(),
        }
    }
}

/// Greedy pursuit as a control source; plays `idle` when nothing is alive.
pub struct GreedyControl<O, F, M> {
    pursuit: GreedyPursuit<O, F>,
    idle: M,
}

impl<O, F, M> GreedyControl<O, F, M> {
    pub fn new(pursuit: GreedyPursuit<O, F>, idle: M) -> Self {
        Self { pursuit, idle }
    }
}

impl<V, O, F> ControlSource<V> for GreedyControl<O, F, V::Move>
where
    V: PursuitView,
    O: DistanceOracle<V::Position>,
    F: Fn(&V::Position, &V::Move) -> V::Position,
{
    fn choose_action(&mut self, view: &V, beliefs: &[Belief<V::Position>]) -> V::Move {
        let position = view.pursuer_position();
        let legal_moves = view.legal_moves();
        let living = view.living_targets();
        let tick = PursuitTick {
            position: &position,
            legal_moves: &legal_moves,
            beliefs,
            living: &living,
        };

        self.pursuit.choose(&tick, || self.idle.clone())
    }
}

/// Tracks one belief per target and delegates the move to `control`.
pub struct TrackingAgent<V: PursuitView, C, D> {
    modules: Vec<Box<dyn InferenceModule<V>>>,
    beliefs: Vec<Belief<V::Position>>,
    control: C,
    display: D,
    first_move: bool,
}

impl<V, C, D> TrackingAgent<V, C, D>
where
    V: PursuitView,
    C: ControlSource<V>,
    D: BeliefDisplay<V::Position>,
{
    pub fn new(modules: Vec<Box<dyn InferenceModule<V>>>, control: C, display: D) -> Self {
        let beliefs = vec![Belief::new(); modules.len()];
        Self {
            modules,
            beliefs,
            control,
            display,
            first_move: true,
        }
    }

    /// Initializes every module and takes a first snapshot of the beliefs.
    pub fn register_initial_state(&mut self, view: &V) {
        for m in self.modules.iter_mut() {
            m.initialize(view);
        }
        self.beliefs = self.modules.iter().map(|m| m.belief()).collect();
        self.first_move = true;
    }

    /// Updates the beliefs, shows them, then asks the control source.
    /// Time does not elapse before the first move.
    pub fn get_action(&mut self, view: &V) -> V::Move {
        for (m, b) in self.modules.iter_mut().zip(self.beliefs.iter_mut()) {
            if !self.first_move {
                m.elapse_time(view);
            }
            m.observe(view);
            *b = m.belief();
        }
        self.first_move = false;

        self.display.update_distributions(&self.beliefs);
        self.control.choose_action(view, &self.beliefs)
    }

    pub fn beliefs(&self) -> &[Belief<V::Position>] {
        &self.beliefs
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridworld::{Cell, Direction};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Open {
        at: Cell,
        living: Vec<bool>,
    }

    impl PursuitView for Open {
        type Position = Cell;
        type Move = Direction;

        fn pursuer_position(&self) -> Cell {
            self.at
        }

        fn legal_moves(&self) -> Vec<Direction> {
            vec![Direction::North, Direction::East, Direction::Stop]
        }

        fn living_targets(&self) -> Vec<bool> {
            self.living.clone()
        }
    }

    struct Manhattan;

    impl DistanceOracle<Cell> for Manhattan {
        fn distance(&self, a: &Cell, b: &Cell) -> f64 {
            a.manhattan(b) as f64
        }
    }

    /// Records the calls it receives into a shared log.
    struct Recording {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        at: Cell,
    }

    impl InferenceModule<Open> for Recording {
        fn initialize(&mut self, _view: &Open) {
            self.log.borrow_mut().push(format!("{} init", self.name));
        }

        fn elapse_time(&mut self, _view: &Open) {
            self.log.borrow_mut().push(format!("{} elapse", self.name));
            self.at = Direction::East.successor(self.at);
        }

        fn observe(&mut self, _view: &Open) {
            self.log.borrow_mut().push(format!("{} observe", self.name));
        }

        fn belief(&self) -> Belief<Cell> {
            Belief::from([(self.at, 1.)])
        }
    }

    #[derive(Default)]
    struct Collecting {
        seen: Vec<Vec<Belief<Cell>>>,
    }

    impl BeliefDisplay<Cell> for &mut Collecting {
        fn update_distributions(&mut self, beliefs: &[Belief<Cell>]) {
            self.seen.push(beliefs.to_vec());
        }
    }

    fn greedy() -> GreedyControl<Manhattan, fn(&Cell, &Direction) -> Cell, Direction> {
        let step: fn(&Cell, &Direction) -> Cell = |c, d| d.successor(*c);
        GreedyControl::new(GreedyPursuit::new(Manhattan, step), Direction::Stop)
    }

    #[test]
    fn no_module_elapses_time_before_the_first_move() {
        let log = Rc::new(RefCell::new(vec![]));
        let modules: Vec<Box<dyn InferenceModule<Open>>> = vec![
            Box::new(Recording {
                name: "a",
                log: Rc::clone(&log),
                at: Cell::new(0, 0),
            }),
            Box::new(Recording {
                name: "b",
                log: Rc::clone(&log),
                at: Cell::new(0, 0),
            }),
        ];
        let view = Open {
            at: Cell::new(0, 0),
            living: vec![true, true],
        };
        let mut agent = TrackingAgent::new(modules, Stationary(Direction::Stop), NullDisplay);

        agent.register_initial_state(&view);
        agent.get_action(&view);
        agent.get_action(&view);

        assert_eq!(
            *log.borrow(),
            vec![
                "a init", "b init", //
                "a observe", "b observe", //
                "a elapse", "a observe", "b elapse", "b observe",
            ]
        );
        assert_eq!(agent.beliefs()[1], Belief::from([(Cell::new(1, 0), 1.)]));
    }

    #[test]
    fn display_receives_every_refresh() {
        let mut display = Collecting::default();
        let modules: Vec<Box<dyn InferenceModule<Open>>> =
            vec![Box::new(StaticBelief::point(Cell::new(2, 0)))];
        let view = Open {
            at: Cell::new(0, 0),
            living: vec![true],
        };

        {
            let mut agent = TrackingAgent::new(modules, greedy(), &mut display);
            agent.register_initial_state(&view);
            assert_eq!(agent.get_action(&view), Direction::East);
            assert_eq!(agent.get_action(&view), Direction::East);
        }

        assert_eq!(display.seen.len(), 2);
        assert_eq!(display.seen[0], vec![Belief::from([(Cell::new(2, 0), 1.)])]);
    }

    #[test]
    fn greedy_control_stops_when_every_target_is_captured() {
        let modules: Vec<Box<dyn InferenceModule<Open>>> =
            vec![Box::new(StaticBelief::point(Cell::new(2, 0)))];
        let view = Open {
            at: Cell::new(0, 0),
            living: vec![false],
        };
        let mut agent = TrackingAgent::new(modules, greedy(), TracingDisplay);
        agent.register_initial_state(&view);

        assert_eq!(agent.get_action(&view), Direction::Stop);
    }

    #[test]
    fn scripted_control_plays_queue_then_idles() {
        let view = Open {
            at: Cell::new(0, 0),
            living: vec![],
        };
        let mut agent: TrackingAgent<Open, _, _> = TrackingAgent::new(
            vec![],
            Scripted::new([Direction::North, Direction::West, Direction::East], Direction::Stop),
            NullDisplay,
        );
        agent.register_initial_state(&view);

        assert_eq!(agent.get_action(&view), Direction::North);
        // West is not legal here.
        assert_eq!(agent.get_action(&view), Direction::Stop);
        assert_eq!(agent.get_action(&view), Direction::East);
        assert_eq!(agent.control().remaining(), 0);
        assert_eq!(agent.get_action(&view), Direction::Stop);

        agent.control_mut().push(Direction::North);
        assert_eq!(agent.get_action(&view), Direction::North);
    }
}
