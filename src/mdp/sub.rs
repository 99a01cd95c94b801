use crate::mdp::model::{Mdp, Transition};
use crate::mdp::strategy::Strategy;

/// A read-through view of an MDP that hides dropped choices. The view shares the
/// state index space of the underlying model and re-densifies the choice indices
/// of every state; the ascending list of surviving original choice indices is
/// computed once at construction.
///
/// States whose every choice was dropped become traps in the view.
pub struct SubMdp<'a, M: Mdp> {
    mdp: &'a M,
    kept: Vec<Vec<usize>>,
}

impl<'a, M: Mdp> SubMdp<'a, M> {
    /// Creates a view of the given model without the dropped choices. The
    /// predicate is evaluated exactly once per state and choice.
    ///
    /// # Arguments
    ///
    /// - `mdp` - the underlying model
    /// - `drop` - true for every choice the view must hide
    pub fn new<D>(mdp: &'a M, drop: D) -> Self
    where
        D: Fn(usize, usize) -> bool,
    {
        let kept: Vec<Vec<usize>> = (0..mdp.num_states())
            .map(|state| (0..mdp.num_choices(state)).filter(|&choice| !drop(state, choice)).collect())
            .collect();

        log::trace!(
            "sub-mdp keeps {} choices over {} states",
            kept.iter().map(Vec::len).sum::<usize>(),
            kept.len()
        );

        SubMdp { mdp, kept }
    }

    /// Returns the underlying model.
    pub fn underlying(&self) -> &M {
        self.mdp
    }

    /// Maps a choice index of the view back to the choice index of the
    /// underlying model.
    pub fn original_choice(&self, state: usize, choice: usize) -> usize {
        self.kept[state][choice]
    }

    /// Rewrites a strategy given in the view's choice index space into the
    /// underlying model's choice index space. Sentinel entries are preserved.
    pub fn lift_strategy(&self, strategy: &mut Strategy) {
        for state in 0..self.kept.len() {
            if let Some(choice) = strategy.choice(state) {
                strategy.set(state, self.kept[state][choice]);
            }
        }
    }
}

impl<M: Mdp> Mdp for SubMdp<'_, M> {
    fn num_states(&self) -> usize {
        self.mdp.num_states()
    }

    fn num_choices(&self, state: usize) -> usize {
        self.kept[state].len()
    }

    fn successors(&self, state: usize, choice: usize) -> &[Transition] {
        self.mdp.successors(state, self.kept[state][choice])
    }
}
