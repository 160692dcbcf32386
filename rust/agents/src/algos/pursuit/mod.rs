//! Greedy pursuit of the nearest, most probable target position.

use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, warn};

/// Weight of each position a hidden target may occupy. Need not be
/// normalised; only the arg-max is used. The ordered map makes ties resolve
/// to the smallest position.
pub type Belief<P> = BTreeMap<P, f64>;

/// True path cost between positions, respecting the maze topology.
/// Unreachable pairs report `f64::INFINITY`.
pub trait DistanceOracle<P> {
    fn distance(&self, a: &P, b: &P) -> f64;
}

/// Inputs of one decision tick. `living[i]` says whether the target
/// tracked by `beliefs[i]` is still in play; targets without a flag are
/// treated as gone.
#[derive(Debug, Clone, Copy)]
pub struct PursuitTick<'a, P, M> {
    pub position: &'a P,
    pub legal_moves: &'a [M],
    pub beliefs: &'a [Belief<P>],
    pub living: &'a [bool],
}

impl<'a, P, M> PursuitTick<'a, P, M> {
    /// Beliefs of the targets still alive, in target order.
    pub fn live_beliefs(&self) -> impl Iterator<Item = &'a Belief<P>> + 'a {
        let living = self.living;
        self.beliefs
            .iter()
            .enumerate()
            .filter(move |(i, _)| living.get(*i).copied().unwrap_or(false))
            .map(|(_, b)| b)
    }
}

/// Position of highest weight; the first such position in map order on ties.
pub fn most_likely_position<P>(belief: &Belief<P>) -> Option<&P> {
    belief
        .iter()
        .fold(None, |best: Option<(&P, f64)>, (p, &w)| match best {
            Some((_, bw)) if bw >= w => best,
            _ => Some((p, w)),
        })
        .map(|(p, _)| p)
}

fn first_argmin<T, I>(items: I) -> Option<(T, f64)>
where
    I: IntoIterator<Item = (T, f64)>,
{
    items.into_iter().fold(None, |best, (t, d)| match best {
        Some((_, bd)) if bd <= d => best,
        _ => Some((t, d)),
    })
}

/// Charges the closest target.
///
/// Each tick: take every live target's most likely position, pick the one
/// nearest to the pursuer by maze distance, then play the legal move whose
/// successor is nearest to it. Ties go to the earlier target and the earlier
/// legal move. Holds no state between ticks.
pub struct GreedyPursuit<O, F> {
    oracle: O,
    successor: F,
}

impl<O, F> GreedyPursuit<O, F> {
    /// `successor(position, move)` applies a move; it must be pure.
    pub fn new(oracle: O, successor: F) -> Self {
        Self { oracle, successor }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Picks a move for this tick. `default` is called, exactly once, when
    /// there is nothing to chase (no live target with a non-empty belief) or
    /// no legal move to play.
    pub fn choose<P, M, D>(&self, tick: &PursuitTick<'_, P, M>, default: D) -> M
    where
        P: Ord + Debug,
        M: Clone + Debug,
        O: DistanceOracle<P>,
        F: Fn(&P, &M) -> P,
        D: FnOnce() -> M,
    {
        let candidates = tick
            .live_beliefs()
            .enumerate()
            .filter_map(|(i, b)| {
                let p = most_likely_position(b);
                if p.is_none() {
                    warn!(index = i, "live target has an empty belief");
                }
                p
            })
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            debug!("no live target to pursue");
            return default();
        }

        let moves = tick.legal_moves;
        match moves {
            [] => default(),
            [only] => only.clone(),
            _ => {
                let goal = self.closest(tick.position, candidates);
                self.best_move(tick.position, moves, goal)
            }
        }
    }

    /// Candidate nearest to `from`; the first one on ties.
    fn closest<'p, P>(&self, from: &P, candidates: Vec<&'p P>) -> &'p P
    where
        O: DistanceOracle<P>,
    {
        let first = candidates[0];
        first_argmin(
            candidates
                .into_iter()
                .map(|c| (c, self.oracle.distance(from, c))),
        )
        .map_or(first, |(c, _)| c)
    }

    fn best_move<P, M>(&self, from: &P, moves: &[M], goal: &P) -> M
    where
        P: Debug,
        M: Clone + Debug,
        O: DistanceOracle<P>,
        F: Fn(&P, &M) -> P,
    {
        let (m, d) = first_argmin(moves.iter().map(|m| {
            let next = (self.successor)(from, m);
            (m, self.oracle.distance(&next, goal))
        }))
        .unwrap_or((&moves[0], f64::INFINITY));

        debug!(?goal, chosen = ?m, distance = d, "pursuit move");
        m.clone()
    }
}
