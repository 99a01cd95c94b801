use crate::mdp::model::{Mdp, MdpError, Transition};

const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

/// An explicit adjacency-list realization of an MDP. Every state owns an ordered
/// list of choices, and every choice owns its successor distribution.
///
/// The model is populated through [`SparseMdp::add_choice`], which validates the
/// distribution before storing it, so a fully built `SparseMdp` always satisfies
/// the [`Mdp`] contract.
///
/// # Examples
///
/// ```
/// use zmec::mdp::model::Mdp;
/// use zmec::mdp::sparse::SparseMdp;
///
/// let mut mdp = SparseMdp::with_states(2);
/// mdp.add_choice(0, &[(1, 1.0)]).unwrap();
/// mdp.add_choice(1, &[(0, 0.5), (1, 0.5)]).unwrap();
///
/// assert_eq!(mdp.num_states(), 2);
/// assert_eq!(mdp.num_choices(1), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SparseMdp {
    transitions: Vec<Vec<Vec<Transition>>>,
}

impl SparseMdp {
    /// Creates an MDP with the given number of states and no choices. States
    /// without choices are traps.
    pub fn with_states(num_states: usize) -> Self {
        SparseMdp {
            transitions: vec![Vec::new(); num_states],
        }
    }

    /// Appends a choice to the given state and returns its choice index. The
    /// successor distribution is validated: probabilities must lie in `(0, 1]`,
    /// targets must be states of the model, and the probabilities must sum to one.
    ///
    /// # Arguments
    ///
    /// - `state` - the state the choice belongs to
    /// - `successors` - pairs of target state and probability
    pub fn add_choice(
        &mut self,
        state: usize,
        successors: &[(usize, f64)],
    ) -> Result<usize, MdpError> {
        if state >= self.transitions.len() {
            return Err(MdpError::UnknownState { state });
        }

        let choice = self.transitions[state].len();
        let mut total = 0f64;
        let mut distribution = Vec::with_capacity(successors.len());
        for &(target, probability) in successors {
            if target >= self.transitions.len() {
                return Err(MdpError::InvalidTarget {
                    state,
                    choice,
                    target,
                });
            }
            if probability <= 0.0 || probability > 1.0 {
                return Err(MdpError::InvalidProbability {
                    state,
                    choice,
                    probability,
                });
            }
            total += probability;
            distribution.push(Transition::new(target, probability));
        }

        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(MdpError::InvalidDistribution {
                state,
                choice,
                total,
            });
        }

        self.transitions[state].push(distribution);
        Ok(choice)
    }
}

impl Mdp for SparseMdp {
    fn num_states(&self) -> usize {
        self.transitions.len()
    }

    fn num_choices(&self, state: usize) -> usize {
        self.transitions[state].len()
    }

    fn successors(&self, state: usize, choice: usize) -> &[Transition] {
        &self.transitions[state][choice]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_indexes_choices() {
        let mut mdp = SparseMdp::with_states(3);

        assert_eq!(mdp.add_choice(0, &[(1, 1.0)]), Ok(0));
        assert_eq!(mdp.add_choice(0, &[(2, 1.0)]), Ok(1));
        assert_eq!(mdp.add_choice(1, &[(0, 0.25), (2, 0.75)]), Ok(0));

        assert_eq!(mdp.num_states(), 3);
        assert_eq!(mdp.num_choices(0), 2);
        assert_eq!(mdp.num_choices(2), 0);
        assert_eq!(
            mdp.successors(1, 0),
            &[Transition::new(0, 0.25), Transition::new(2, 0.75)]
        );
    }

    #[test]
    fn rejects_unknown_state() {
        let mut mdp = SparseMdp::with_states(1);

        assert_eq!(
            mdp.add_choice(1, &[(0, 1.0)]),
            Err(MdpError::UnknownState { state: 1 })
        );
    }

    #[test]
    fn rejects_out_of_range_target() {
        let mut mdp = SparseMdp::with_states(2);

        assert_eq!(
            mdp.add_choice(0, &[(5, 1.0)]),
            Err(MdpError::InvalidTarget {
                state: 0,
                choice: 0,
                target: 5,
            })
        );
    }

    #[test]
    fn rejects_invalid_probability() {
        let mut mdp = SparseMdp::with_states(2);

        assert_eq!(
            mdp.add_choice(0, &[(1, 0.0)]),
            Err(MdpError::InvalidProbability {
                state: 0,
                choice: 0,
                probability: 0.0,
            })
        );
        assert_eq!(
            mdp.add_choice(0, &[(1, 1.5)]),
            Err(MdpError::InvalidProbability {
                state: 0,
                choice: 0,
                probability: 1.5,
            })
        );
    }

    #[test]
    fn rejects_deficient_distribution() {
        let mut mdp = SparseMdp::with_states(2);

        assert!(matches!(
            mdp.add_choice(0, &[(0, 0.5), (1, 0.2)]),
            Err(MdpError::InvalidDistribution {
                state: 0,
                choice: 0,
                ..
            })
        ));
    }

    #[test]
    fn accepts_distribution_within_tolerance() {
        let mut mdp = SparseMdp::with_states(3);
        let third = 1.0 / 3.0;

        assert!(mdp.add_choice(0, &[(0, third), (1, third), (2, third)]).is_ok());
    }
}
