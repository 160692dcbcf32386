pub mod common;
pub mod vi;

use gridworld::Policy;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;
use thiserror::Error;

/// Tolerance on the sum of transition probabilities for one (state, action).
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// A fully known model: every legal (state, action) pair lists its
/// successors with probabilities that sum to one. The terminal state is the
/// only state without legal actions.
pub trait Mdp {
    type State: Clone + Eq + Hash + Debug;

    type Action: Clone + PartialEq + Debug;

    /// Every state, in a fixed order.
    fn states(&self) -> Vec<Self::State>;

    /// Legal actions in a fixed order, empty exactly at the terminal state.
    fn actions(&self, s: &Self::State) -> Vec<Self::Action>;

    fn transitions(&self, s: &Self::State, a: &Self::Action) -> Vec<(Self::State, f64)>;

    fn reward(&self, s: &Self::State, a: &Self::Action, next: &Self::State) -> f64;

    fn is_terminal(&self, s: &Self::State) -> bool;
}

pub trait MdpSolver<S, A> {
    fn v_star(&self, s: &S) -> f64;

    fn q_star(&self, s: &S, a: &A) -> f64;

    /// `None` where there is no legal action.
    fn pi_star(&self, s: &S) -> Option<A>;

    /// Acting interface; the policy without exploration.
    fn action(&self, s: &S) -> Option<A> {
        self.pi_star(s)
    }
}

pub struct MdpSolverPolicy<S, A> {
    pub mdp_solver: Rc<dyn MdpSolver<S, A>>,
}

impl<S, A> Policy<S, A> for MdpSolverPolicy<S, A> {
    fn policy(&self, s: &S) -> Option<A> {
        self.mdp_solver.action(s)
    }
}

/// A model that breaks the [`Mdp`] contract.
#[derive(Debug, Error, PartialEq)]
pub enum MdpError {
    #[error("discount {0} is outside [0, 1]")]
    InvalidDiscount(f64),

    #[error("transition probabilities for {state} / {action} sum to {sum}, expected 1")]
    ProbabilitySum {
        state: String,
        action: String,
        sum: f64,
    },

    #[error("invalid transition probability {p} for {state} / {action}")]
    InvalidProbability {
        state: String,
        action: String,
        p: f64,
    },

    #[error("reward for {state} / {action} -> {next} is not finite: {reward}")]
    NonFiniteReward {
        state: String,
        action: String,
        next: String,
        reward: f64,
    },

    #[error("non-terminal state {0} has no legal actions")]
    NoActions(String),

    #[error("terminal state {0} has legal actions")]
    TerminalWithActions(String),
}

pub type Result<T> = std::result::Result<T, MdpError>;

/// Checks the whole model against the [`Mdp`] contract.
pub fn validate<M: Mdp + ?Sized>(mdp: &M, gamma: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&gamma) {
        return Err(MdpError::InvalidDiscount(gamma));
    }

    for s in mdp.states() {
        let actions = mdp.actions(&s);
        match (mdp.is_terminal(&s), actions.is_empty()) {
            (true, false) => return Err(MdpError::TerminalWithActions(format!("{s:?}"))),
            (false, true) => return Err(MdpError::NoActions(format!("{s:?}"))),
            _ => {}
        }

        for a in &actions {
            let ts = mdp.transitions(&s, a);
            for (next, p) in &ts {
                if !p.is_finite() || *p < 0. {
                    return Err(MdpError::InvalidProbability {
                        state: format!("{s:?}"),
                        action: format!("{a:?}"),
                        p: *p,
                    });
                }

                let reward = mdp.reward(&s, a, next);
                if !reward.is_finite() {
                    return Err(MdpError::NonFiniteReward {
                        state: format!("{s:?}"),
                        action: format!("{a:?}"),
                        next: format!("{next:?}"),
                        reward,
                    });
                }
            }

            let sum = ts.iter().map(|(_, p)| p).sum::<f64>();
            if (sum - 1.).abs() > PROBABILITY_TOLERANCE {
                return Err(MdpError::ProbabilitySum {
                    state: format!("{s:?}"),
                    action: format!("{a:?}"),
                    sum,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_mdps {
    use super::*;

    /// 1x3 corridor `0 - 1 - 2`; exiting from 2 pays `reward` and ends the
    /// episode in `Corridor::TERMINAL`. Moves are deterministic.
    pub struct Corridor {
        pub reward: f64,
        pub living_reward: f64,
    }

    impl Corridor {
        pub const TERMINAL: i32 = -1;
    }

    impl Mdp for Corridor {
        type State = i32;
        type Action = &'static str;

        fn states(&self) -> Vec<i32> {
            vec![0, 1, 2, Self::TERMINAL]
        }

        fn actions(&self, s: &i32) -> Vec<&'static str> {
            match s {
                2 => vec!["exit"],
                0 | 1 => vec!["left", "right"],
                _ => vec![],
            }
        }

        fn transitions(&self, s: &i32, a: &&'static str) -> Vec<(i32, f64)> {
            match (*s, *a) {
                (2, "exit") => vec![(Self::TERMINAL, 1.)],
                (s, "left") => vec![((s - 1).max(0), 1.)],
                (s, "right") => vec![(s + 1, 1.)],
                _ => vec![],
            }
        }

        fn reward(&self, s: &i32, _a: &&'static str, _next: &i32) -> f64 {
            match s {
                2 => self.reward,
                s if *s == Self::TERMINAL => 0.,
                _ => self.living_reward,
            }
        }

        fn is_terminal(&self, s: &i32) -> bool {
            *s == Self::TERMINAL
        }
    }

    /// Hand-written model whose pieces tests can break one at a time.
    pub struct Table {
        pub states: Vec<i32>,
        pub actions: Vec<(i32, Vec<i32>)>,
        pub transitions: Vec<((i32, i32), Vec<(i32, f64)>)>,
        pub rewards: Vec<((i32, i32, i32), f64)>,
        pub terminal: i32,
    }

    impl Mdp for Table {
        type State = i32;
        type Action = i32;

        fn states(&self) -> Vec<i32> {
            self.states.clone()
        }

        fn actions(&self, s: &i32) -> Vec<i32> {
            self.actions
                .iter()
                .find(|(x, _)| x == s)
                .map(|(_, a)| a.clone())
                .unwrap_or_default()
        }

        fn transitions(&self, s: &i32, a: &i32) -> Vec<(i32, f64)> {
            self.transitions
                .iter()
                .find(|(k, _)| *k == (*s, *a))
                .map(|(_, t)| t.clone())
                .unwrap_or_default()
        }

        fn reward(&self, s: &i32, a: &i32, next: &i32) -> f64 {
            self.rewards
                .iter()
                .find(|(k, _)| *k == (*s, *a, *next))
                .map_or(0., |(_, r)| *r)
        }

        fn is_terminal(&self, s: &i32) -> bool {
            *s == self.terminal
        }
    }

    /// Two states; from 0 action 0 is a fair coin between 0 and 1, action 1
    /// moves to the terminal state 1.
    pub fn coin() -> Table {
        Table {
            states: vec![0, 1],
            actions: vec![(0, vec![0, 1])],
            transitions: vec![
                ((0, 0), vec![(0, 0.5), (1, 0.5)]),
                ((0, 1), vec![(1, 1.)]),
            ],
            rewards: vec![((0, 0, 1), 4.), ((0, 1, 1), 1.)],
            terminal: 1,
        }
    }
}
