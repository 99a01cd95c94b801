use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MdpError {
    #[error("State {state} does not exist in the model.")]
    UnknownState { state: usize },
    #[error("Probability {probability} of choice {choice} at state {state} is outside (0, 1].")]
    InvalidProbability {
        state: usize,
        choice: usize,
        probability: f64,
    },
    #[error("Successor probabilities of choice {choice} at state {state} sum to {total} instead of 1.")]
    InvalidDistribution {
        state: usize,
        choice: usize,
        total: f64,
    },
    #[error("Target {target} of choice {choice} at state {state} is out of range.")]
    InvalidTarget {
        state: usize,
        choice: usize,
        target: usize,
    },
    #[error("State reward of state {state} is negative.")]
    NegativeStateReward { state: usize },
    #[error("Transition reward of choice {choice} at state {state} is negative.")]
    NegativeTransitionReward { state: usize, choice: usize },
    #[error("Transition reward of choice {choice} at state {state} differs across successors.")]
    NonUniformReward { state: usize, choice: usize },
    #[error("State {state} belongs to more than one equivalence class.")]
    OverlappingClasses { state: usize },
    #[error("Equivalence class {index} is empty.")]
    EmptyClass { index: usize },
    #[error("State {state} of class {class} cannot reach the chosen exit with probability one.")]
    Certification { class: usize, state: usize },
}

/// A probabilistic transition to a target state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub target: usize,
    pub probability: f64,
}

impl Transition {
    pub fn new(target: usize, probability: f64) -> Self {
        Transition {
            target,
            probability,
        }
    }
}

/// Represents a Markov Decision Process (MDP) over a dense state index space. States
/// are indexed `0` up to the number of states, and the choices of each state are
/// indexed `0` up to the number of choices of that state. Each choice leads to a
/// probability distribution over successor states.
///
/// Views built on top of an MDP (see [`crate::mdp::sub::SubMdp`] and
/// [`crate::quotient::view::QuotientMdp`]) share the state index space of the
/// underlying model, so state indices remain stable across all views.
pub trait Mdp {
    /// Returns the number of states.
    fn num_states(&self) -> usize;

    /// Returns the number of choices available at the given state.
    fn num_choices(&self, state: usize) -> usize;

    /// Returns the successor distribution of the given state and choice. The
    /// probabilities are in `(0, 1]` and sum to one.
    fn successors(&self, state: usize, choice: usize) -> &[Transition];

    /// Returns true if every successor of the given choice satisfies the predicate.
    /// Short-circuits on the first successor that does not.
    fn all_successors_match<P>(&self, state: usize, choice: usize, predicate: P) -> bool
    where
        P: Fn(usize) -> bool,
    {
        self.successors(state, choice)
            .iter()
            .all(|transition| predicate(transition.target))
    }

    /// Returns true if some successor of the given choice lies in the given set.
    /// Short-circuits on the first successor that does.
    fn some_successor_in_set(&self, state: usize, choice: usize, set: &BTreeSet<usize>) -> bool {
        self.successors(state, choice)
            .iter()
            .any(|transition| set.contains(&transition.target))
    }

    /// Returns true if the given state has no outgoing choices.
    fn is_trap(&self, state: usize) -> bool {
        self.num_choices(state) == 0
    }

    /// Returns the set of reachable states. Explicit models are built over their
    /// reachable fragment, so by default every state is considered reachable.
    fn reachable_states(&self) -> BTreeSet<usize> {
        (0..self.num_states()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::sparse::SparseMdp;

    fn chain() -> SparseMdp {
        // 0 -> 1 -> 2, where state 2 is absorbing via a self-loop and state 1
        // additionally branches uniformly between 0 and 2
        let mut mdp = SparseMdp::with_states(3);
        mdp.add_choice(0, &[(1, 1.0)]).unwrap();
        mdp.add_choice(1, &[(0, 0.5), (2, 0.5)]).unwrap();
        mdp.add_choice(2, &[(2, 1.0)]).unwrap();
        mdp
    }

    #[test]
    fn all_successors_match() {
        let mdp = chain();

        assert!(mdp.all_successors_match(0, 0, |target| target == 1));
        assert!(mdp.all_successors_match(1, 0, |target| target != 1));
        assert!(!mdp.all_successors_match(1, 0, |target| target == 2));
    }

    #[test]
    fn some_successor_in_set() {
        let mdp = chain();
        let set = BTreeSet::from([2]);

        assert!(!mdp.some_successor_in_set(0, 0, &set));
        assert!(mdp.some_successor_in_set(1, 0, &set));
        assert!(mdp.some_successor_in_set(2, 0, &set));
    }

    #[test]
    fn traps_and_reachability() {
        let mut mdp = SparseMdp::with_states(2);
        mdp.add_choice(0, &[(1, 1.0)]).unwrap();

        assert!(!mdp.is_trap(0));
        assert!(mdp.is_trap(1));
        assert_eq!(mdp.reachable_states(), BTreeSet::from([0, 1]));
    }
}
