use serde::{Deserialize, Serialize};

/// Maps an observed state to the action to take in it. `None` means the
/// policy prescribes nothing there (e.g. a terminal state).
pub trait Policy<S, A> {
    fn policy(&self, s: &S) -> Option<A>;
}

/// One step of an episode: the state acted in, the action taken and the
/// reward received for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEvent<S, A> {
    pub s: S,
    pub a: A,
    pub r: f64,
}
