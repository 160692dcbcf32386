use crate::algos::model_based::mdp::Mdp;
use gridworld::{EpisodeEvent, Policy};
use rand::distributions::{WeightedError, WeightedIndex};
use rand::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("{0} has no successors")]
    NoSuccessors(String),

    #[error("invalid successor weights: {0}")]
    Weights(#[from] WeightedError),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> f64;
}

impl<S: Clone> Weighted<S> for (S, f64) {
    fn s(&self) -> S {
        self.0.clone()
    }

    fn p(&self) -> f64 {
        self.1
    }
}

/// Samples one item in proportion to its weight.
pub fn pick_next<T, S, R>(rng: &mut R, ts: &[T]) -> Result<S>
where
    T: Weighted<S>,
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p()))?;
    Ok(ts[dist.sample(rng)].s())
}

/// Plays one episode of `mdp` under `policy` from `start`.
///
/// The episode ends at a terminal state, at a state where the policy has no
/// action, or after `max_steps` steps.
pub fn rollout<M, P, R>(
    mdp: &M,
    policy: &P,
    start: M::State,
    max_steps: usize,
    rng: &mut R,
) -> Result<Vec<EpisodeEvent<M::State, M::Action>>>
where
    M: Mdp + ?Sized,
    P: Policy<M::State, M::Action> + ?Sized,
    R: Rng + ?Sized,
{
    let mut episode = vec![];
    let mut s = start;
    while episode.len() < max_steps && !mdp.is_terminal(&s) {
        let Some(a) = policy.policy(&s) else {
            break;
        };

        let ts = mdp.transitions(&s, &a);
        if ts.is_empty() {
            return Err(SimulationError::NoSuccessors(format!("{s:?} / {a:?}")));
        }
        let next = pick_next(rng, &ts)?;
        let r = mdp.reward(&s, &a, &next);
        episode.push(EpisodeEvent { s, a, r });
        s = next;
    }

    debug!(steps = episode.len(), last = ?s, "episode finished");
    Ok(episode)
}

/// Σ γ^t · r_t over the episode.
pub fn discounted_return<S, A>(episode: &[EpisodeEvent<S, A>], gamma: f64) -> f64 {
    episode
        .iter()
        .rev()
        .fold(0., |g, event| event.r + gamma * g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algos::model_based::mdp::test_mdps::*;
    use crate::algos::model_based::mdp::{vi::ValueIteration, MdpSolver, MdpSolverPolicy};
    use float_eq::*;
    use std::rc::Rc;

    struct Always(&'static str);

    impl Policy<i32, &'static str> for Always {
        fn policy(&self, _s: &i32) -> Option<&'static str> {
            Some(self.0)
        }
    }

    /// Always flips the coin.
    struct Gamble;

    impl Policy<i32, i32> for Gamble {
        fn policy(&self, _s: &i32) -> Option<i32> {
            Some(0)
        }
    }

    #[test]
    fn pick_next_follows_weights() {
        let items = [(0usize, 0.2), (1, 0.8)];
        let mut counts = [0; 2];

        let rng = &mut StdRng::seed_from_u64(7);
        let n = 10000;
        for _ in 0..n {
            counts[pick_next(rng, &items).unwrap()] += 1;
        }

        assert_float_eq!(counts[0] as f64 / n as f64, 0.2, abs <= 2e-2);
        assert_float_eq!(counts[1] as f64 / n as f64, 0.8, abs <= 2e-2);
    }

    #[test]
    fn pick_next_rejects_bad_weights() {
        let rng = &mut StdRng::seed_from_u64(0);

        assert_eq!(
            pick_next::<(u8, f64), u8, _>(rng, &[]),
            Err(SimulationError::Weights(WeightedError::NoItem))
        );
        assert_eq!(
            pick_next::<_, u8, _>(rng, &[(1u8, 0.), (2, 0.)]),
            Err(SimulationError::Weights(WeightedError::AllWeightsZero))
        );
    }

    #[test]
    fn optimal_rollout_on_corridor_earns_the_optimal_value() {
        let mdp = Rc::new(Corridor {
            reward: 1.,
            living_reward: 0.,
        });
        let vi = Rc::new(ValueIteration::new(Rc::clone(&mdp), 0.9, 100).unwrap());
        let policy = MdpSolverPolicy {
            mdp_solver: Rc::clone(&vi) as Rc<dyn MdpSolver<i32, &'static str>>,
        };

        let episode = rollout(&*mdp, &policy, 0, 100, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(
            episode.iter().map(|e| (e.s, e.a)).collect::<Vec<_>>(),
            vec![(0, "right"), (1, "right"), (2, "exit")]
        );
        assert_float_eq!(discounted_return(&episode, 0.9), vi.v_star(&0), abs <= 1e-12);
    }

    #[test]
    fn rollout_is_cut_at_max_steps() {
        let mdp = Corridor {
            reward: 1.,
            living_reward: -1.,
        };

        let episode = rollout(&mdp, &Always("left"), 1, 5, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(episode.len(), 5);
        assert_float_eq!(discounted_return(&episode, 1.), -5., abs <= 1e-12);
    }

    #[test]
    fn rollout_from_terminal_is_empty() {
        let episode = rollout(&coin(), &Gamble, 1, 5, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(episode.is_empty());
    }

    #[test]
    fn same_seed_same_episode() {
        let mdp = coin();
        let a = rollout(&mdp, &Gamble, 0, 50, &mut StdRng::seed_from_u64(2718)).unwrap();
        let b = rollout(&mdp, &Gamble, 0, 50, &mut StdRng::seed_from_u64(2718)).unwrap();

        assert_eq!(a, b);
        assert!(!a.is_empty());
        // The only reward is paid on the flip that ends the episode.
        if a.len() < 50 {
            assert_float_eq!(discounted_return(&a, 1.), 4., abs <= 1e-12);
        }
    }

    #[test]
    fn discounted_return_weights_later_rewards_less() {
        let episode = vec![
            EpisodeEvent { s: 0, a: 0, r: 1. },
            EpisodeEvent { s: 1, a: 0, r: 2. },
            EpisodeEvent { s: 2, a: 0, r: 4. },
        ];

        assert_float_eq!(discounted_return(&episode, 0.5), 3., abs <= 1e-12);
        assert_eq!(discounted_return::<i32, i32>(&[], 0.5), 0.);
    }
}
