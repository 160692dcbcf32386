use super::common::*;
use super::{validate, Mdp, MdpSolver, Result};
use std::rc::Rc;
use tracing::{debug, info};

/// Synchronous value iteration.
///
/// Each sweep computes every state's Bellman backup from a frozen copy of the
/// previous sweep's table and then swaps the new table in whole, so the
/// result does not depend on the order states are enumerated in. All work
/// happens at construction; afterwards the solver is read only.
///
/// Ref: Sutton & Barto 2018, section 4.4.
pub struct ValueIteration<M: Mdp + ?Sized> {
    mdp: Rc<M>,
    gamma: f64,
    values: ValueTable<M::State>,
    iterations: usize,
    residual: f64,
}

impl<M: Mdp + ?Sized> ValueIteration<M> {
    /// Runs exactly `iterations` sweeps.
    pub fn new(mdp: Rc<M>, gamma: f64, iterations: usize) -> Result<Self> {
        Self::run(mdp, gamma, iterations, None)
    }

    /// Runs sweeps until the largest change of a sweep drops below `theta`,
    /// or `max_iterations` sweeps have been made.
    pub fn until_converged(
        mdp: Rc<M>,
        gamma: f64,
        theta: f64,
        max_iterations: usize,
    ) -> Result<Self> {
        Self::run(mdp, gamma, max_iterations, Some(theta))
    }

    fn run(mdp: Rc<M>, gamma: f64, iterations: usize, theta: Option<f64>) -> Result<Self> {
        validate(&*mdp, gamma)?;

        let states = mdp.states();
        let mut values = ValueTable::new();
        let mut residual = f64::INFINITY;
        let mut done = 0;
        while done < iterations {
            let next = sweep(&*mdp, &values, gamma, &states);
            residual = next.max_abs_diff(&values);
            values = next;
            done += 1;
            debug!(iteration = done, residual, "value iteration sweep");

            if theta.is_some_and(|theta| residual < theta) {
                break;
            }
        }

        info!(
            states = states.len(),
            iterations = done,
            residual,
            "value iteration finished"
        );

        Ok(Self {
            mdp,
            gamma,
            values,
            iterations: done,
            residual,
        })
    }

    /// Number of sweeps actually made.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Largest change made by the last sweep; infinite if none ran.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn values(&self) -> &ValueTable<M::State> {
        &self.values
    }

    pub fn mdp(&self) -> &M {
        &self.mdp
    }
}

fn sweep<M: Mdp + ?Sized>(
    mdp: &M,
    prev: &ValueTable<M::State>,
    gamma: f64,
    states: &[M::State],
) -> ValueTable<M::State> {
    let mut next = ValueTable::new();
    for s in states {
        let best = first_argmax(
            mdp.actions(s)
                .into_iter()
                .map(|a| ((), q_value(mdp, prev, gamma, s, &a))),
        );
        next.insert(s.clone(), best.map_or(0., |(_, q)| q));
    }

    next
}

impl<M: Mdp + ?Sized> MdpSolver<M::State, M::Action> for ValueIteration<M> {
    fn v_star(&self, s: &M::State) -> f64 {
        self.values.get(s)
    }

    fn q_star(&self, s: &M::State, a: &M::Action) -> f64 {
        q_value(&*self.mdp, &self.values, self.gamma, s, a)
    }

    fn pi_star(&self, s: &M::State) -> Option<M::Action> {
        if self.mdp.is_terminal(s) {
            return None;
        }

        first_argmax(self.mdp.actions(s).into_iter().map(|a| {
            let q = self.q_star(s, &a);
            (a, q)
        }))
        .map(|(a, _)| a)
    }
}
