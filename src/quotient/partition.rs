use crate::mdp::model::MdpError;
use std::collections::BTreeSet;

/// Represents an equivalence partition of a dense state index space. The
/// partition is built from a list of disjoint non-empty classes; every state
/// outside those classes is implicitly a singleton class of its own. The
/// representative of a class is its smallest member, so a state outside every
/// supplied class represents itself.
///
/// All queries are answered in constant time from tables computed at
/// construction.
#[derive(Debug, Clone)]
pub struct Partition {
    class_of: Vec<Option<usize>>,
    classes: Vec<BTreeSet<usize>>,
    representatives: Vec<usize>,
}

impl Partition {
    /// Builds a partition of `num_states` states from the given classes. The
    /// classes must be non-empty, disjoint, and contained in the state space.
    ///
    /// # Arguments
    ///
    /// - `num_states` - the size of the state index space
    /// - `classes` - the non-trivial equivalence classes
    pub fn from_classes(
        num_states: usize,
        classes: Vec<BTreeSet<usize>>,
    ) -> Result<Self, MdpError> {
        let mut class_of = vec![None; num_states];
        let mut representatives = Vec::with_capacity(classes.len());

        for (index, class) in classes.iter().enumerate() {
            let representative = match class.iter().next() {
                Some(&smallest) => smallest,
                None => return Err(MdpError::EmptyClass { index }),
            };
            representatives.push(representative);
            for &state in class {
                if state >= num_states {
                    return Err(MdpError::UnknownState { state });
                }
                if class_of[state].is_some() {
                    return Err(MdpError::OverlappingClasses { state });
                }
                class_of[state] = Some(index);
            }
        }

        Ok(Partition {
            class_of,
            classes,
            representatives,
        })
    }

    /// Returns the number of states the partition covers.
    pub fn num_states(&self) -> usize {
        self.class_of.len()
    }

    /// Returns the number of non-trivial classes.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Returns the members of the given class in ascending order.
    pub fn class_at(&self, index: usize) -> &BTreeSet<usize> {
        &self.classes[index]
    }

    /// Returns the representative of the given class.
    pub fn representative_at(&self, index: usize) -> usize {
        self.representatives[index]
    }

    /// Returns the class of the given state, or None for singleton states.
    pub fn class_of(&self, state: usize) -> Option<usize> {
        self.class_of[state]
    }

    /// Returns true if both states belong to the same class. A singleton state
    /// is only equivalent to itself.
    pub fn same_class(&self, state: usize, other: usize) -> bool {
        match (self.class_of[state], self.class_of[other]) {
            (Some(left), Some(right)) => left == right,
            (None, None) => state == other,
            _ => false,
        }
    }

    /// Returns the representative of the class the given state belongs to.
    pub fn map_to_representative(&self, state: usize) -> usize {
        match self.class_of[state] {
            Some(index) => self.representatives[index],
            None => state,
        }
    }

    /// Returns true if the given state represents its class.
    pub fn is_representative(&self, state: usize) -> bool {
        self.map_to_representative(state) == state
    }

    /// Returns the states that do not represent their class.
    pub fn non_representative_states(&self) -> BTreeSet<usize> {
        (0..self.class_of.len())
            .filter(|&state| !self.is_representative(state))
            .collect()
    }
}
