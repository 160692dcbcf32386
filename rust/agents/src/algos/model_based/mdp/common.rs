use super::Mdp;
use std::collections::HashMap;
use std::hash::Hash;

/// State values with an implicit zero for every state never written.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable<S: Eq + Hash> {
    values: HashMap<S, f64>,
}

impl<S: Eq + Hash> ValueTable<S> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// 0 for states absent from the table.
    pub fn get(&self, s: &S) -> f64 {
        self.values.get(s).copied().unwrap_or(0.)
    }

    pub fn insert(&mut self, s: S, v: f64) {
        self.values.insert(s, v);
    }

    pub fn contains(&self, s: &S) -> bool {
        self.values.contains_key(s)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &f64)> {
        self.values.iter()
    }

    /// Largest absolute difference over the states of either table.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.values
            .keys()
            .chain(other.values.keys())
            .map(|s| (self.get(s) - other.get(s)).abs())
            .fold(0., f64::max)
    }
}

impl<S: Eq + Hash> Default for ValueTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Q(s,a) = Σ p · (R(s,a,s') + γ · V(s')) over the successors of (s, a).
pub fn q_value<M: Mdp + ?Sized>(
    mdp: &M,
    values: &ValueTable<M::State>,
    gamma: f64,
    s: &M::State,
    a: &M::Action,
) -> f64 {
    mdp.transitions(s, a)
        .iter()
        .map(|(next, p)| p * (mdp.reward(s, a, next) + gamma * values.get(next)))
        .sum()
}

/// First item holding the maximum; later ties do not displace it.
pub fn first_argmax<T, I>(items: I) -> Option<(T, f64)>
where
    I: IntoIterator<Item = (T, f64)>,
{
    items.into_iter().fold(None, |best, (t, v)| match best {
        Some((_, bv)) if bv >= v => best,
        _ => Some((t, v)),
    })
}
