use crate::mdp::model::{Mdp, Transition};
use crate::quotient::partition::Partition;

/// A read-through view collapsing each class of an equivalence partition into
/// its representative state.
///
/// Non-representative states expose zero choices and thereby become traps. A
/// representative exposes the union of the inner model's choices over all of
/// its class members, enumerated by walking the members in ascending order and,
/// within each member, the inner choices in ascending order. That enumeration
/// fixes the quotient choice indices, so rebuilding the view over the same
/// inner model always yields identical indices.
///
/// Successor distributions are served unchanged from the inner model: target
/// states are never remapped, since the view shares the inner state index
/// space. Callers that need class-free targets must filter the inner model's
/// choices before constructing the view.
pub struct QuotientMdp<M: Mdp> {
    inner: M,
    partition: Partition,
    choices: Vec<Vec<(usize, usize)>>,
}

impl<M: Mdp> QuotientMdp<M> {
    /// Collapses the given model under the given partition.
    pub fn new(inner: M, partition: Partition) -> Self {
        let num_states = inner.num_states();
        let mut choices = vec![Vec::new(); num_states];
        for state in 0..num_states {
            if !partition.is_representative(state) {
                continue;
            }
            let mut list = Vec::new();
            match partition.class_of(state) {
                Some(index) => {
                    for &member in partition.class_at(index) {
                        for choice in 0..inner.num_choices(member) {
                            list.push((member, choice));
                        }
                    }
                }
                None => {
                    for choice in 0..inner.num_choices(state) {
                        list.push((state, choice));
                    }
                }
            }
            choices[state] = list;
        }

        QuotientMdp {
            inner,
            partition,
            choices,
        }
    }

    /// Returns the collapsed inner model.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Returns the partition the view collapses.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Maps a quotient choice of a representative back to the class member and
    /// inner choice index it was lifted from.
    pub fn map_to_original(&self, state: usize, choice: usize) -> (usize, usize) {
        self.choices[state][choice]
    }

    /// Sentinel-aware variant of [`QuotientMdp::map_to_original`]: returns None
    /// for the negative markers schedulers use in place of choice indices.
    pub fn map_raw_to_original(&self, state: usize, raw: i32) -> Option<(usize, usize)> {
        if raw < 0 {
            None
        } else {
            Some(self.choices[state][raw as usize])
        }
    }
}

impl<M: Mdp> Mdp for QuotientMdp<M> {
    fn num_states(&self) -> usize {
        self.inner.num_states()
    }

    fn num_choices(&self, state: usize) -> usize {
        self.choices[state].len()
    }

    fn successors(&self, state: usize, choice: usize) -> &[Transition] {
        let (member, inner_choice) = self.choices[state][choice];
        self.inner.successors(member, inner_choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::sparse::SparseMdp;
    use std::collections::BTreeSet;

    fn collapsed() -> QuotientMdp<SparseMdp> {
        // class {0, 1} with choices on both members, state 2 a singleton
        let mut mdp = SparseMdp::with_states(3);
        mdp.add_choice(0, &[(2, 1.0)]).unwrap();
        mdp.add_choice(1, &[(0, 0.5), (2, 0.5)]).unwrap();
        mdp.add_choice(1, &[(2, 1.0)]).unwrap();
        mdp.add_choice(2, &[(2, 1.0)]).unwrap();

        let partition = Partition::from_classes(3, vec![BTreeSet::from([0, 1])]).unwrap();
        QuotientMdp::new(mdp, partition)
    }

    #[test]
    fn representative_unions_member_choices_in_order() {
        let quotient = collapsed();

        assert_eq!(quotient.num_choices(0), 3);
        assert_eq!(quotient.map_to_original(0, 0), (0, 0));
        assert_eq!(quotient.map_to_original(0, 1), (1, 0));
        assert_eq!(quotient.map_to_original(0, 2), (1, 1));
    }

    #[test]
    fn non_representatives_become_traps() {
        let quotient = collapsed();

        assert!(quotient.is_trap(1));
        assert!(!quotient.is_trap(0));
        assert!(!quotient.is_trap(2));
    }

    #[test]
    fn singletons_keep_their_own_choices() {
        let quotient = collapsed();

        assert_eq!(quotient.num_choices(2), 1);
        assert_eq!(quotient.map_to_original(2, 0), (2, 0));
    }

    #[test]
    fn successors_are_served_without_target_remapping() {
        let quotient = collapsed();

        assert_eq!(
            quotient.successors(0, 1),
            &[Transition::new(0, 0.5), Transition::new(2, 0.5)]
        );
    }

    #[test]
    fn mapping_is_injective_over_quotient_choices() {
        let quotient = collapsed();
        let mut seen = BTreeSet::new();

        for choice in 0..quotient.num_choices(0) {
            assert!(seen.insert(quotient.map_to_original(0, choice)));
        }
    }

    #[test]
    fn sentinel_markers_map_to_none() {
        let quotient = collapsed();

        assert_eq!(quotient.map_raw_to_original(0, -1), None);
        assert_eq!(quotient.map_raw_to_original(0, -2), None);
        assert_eq!(quotient.map_raw_to_original(0, 1), Some((1, 0)));
    }
}
