use crate::analysis::ec::EcComputer;
use crate::analysis::reach::{prob0e, prob1e};
use crate::mdp::model::{Mdp, MdpError};
use crate::mdp::reward::{RewardModel, StateChoiceRewards};
use crate::mdp::strategy::{Strategy, ARBITRARY};
use crate::mdp::sub::SubMdp;
use crate::quotient::partition::Partition;
use crate::quotient::view::QuotientMdp;
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use std::collections::BTreeSet;

/// The zero-reward end-component quotient of an MDP.
///
/// A zero-reward end component is a maximal end component of the sub-MDP that
/// remains after deleting every positive-reward choice: a sub-behavior in which
/// a scheduler can keep the process running forever without collecting reward.
/// Left in place, such components make expected-reward iteration diverge; the
/// quotient collapses each of them into its representative state, keeping only
/// the choices that leave the component or carry reward.
///
/// The quotient owns its intermediate views and borrows the original model,
/// which is never mutated. The collapsed view (together with the loop-filtered
/// sub-view and the partition inside it) is released before the zero-reward
/// fragment.
pub struct ZeroRewardEcQuotient<'a, M: Mdp> {
    quotient: QuotientMdp<SubMdp<'a, M>>,
    rewards: StateChoiceRewards,
    fragment: SubMdp<'a, M>,
}

impl<'a, M: Mdp> ZeroRewardEcQuotient<'a, M> {
    /// Builds the quotient of the given model under the given reward structure.
    /// Returns None if the zero-reward fragment has no end component, in which
    /// case the caller proceeds with the original model.
    ///
    /// # Arguments
    ///
    /// - `mdp` - the original model
    /// - `restriction` - the states to search for components, or None for every
    ///   reachable state
    /// - `rewards` - the reward structure of the original model
    pub fn build<R: RewardModel>(
        mdp: &'a M,
        restriction: Option<&BTreeSet<usize>>,
        rewards: &R,
    ) -> Result<Option<Self>, MdpError> {
        let restriction = match restriction {
            Some(states) => states.clone(),
            None => mdp.reachable_states(),
        };
        let drop_positive = |state: usize, choice: usize| {
            rewards.state_reward(state) > 0.0 || rewards.transition_reward(state, choice) > 0.0
        };

        // the zero-reward fragment and its maximal end components
        let fragment = SubMdp::new(mdp, &drop_positive);
        let components = EcComputer::new(&fragment).maximal_end_components(&restriction);
        log::debug!(
            "found {} zero-reward end components covering {} states",
            components.len(),
            components.iter().map(BTreeSet::len).sum::<usize>()
        );
        if components.is_empty() {
            return Ok(None);
        }

        let partition = Partition::from_classes(mdp.num_states(), components)?;

        // drop the zero-reward choices that never leave their class; positive
        // and leaving choices survive into the collapsed view
        let drop_internal = |state: usize, choice: usize| {
            !drop_positive(state, choice)
                && restriction.contains(&state)
                && mdp.all_successors_match(state, choice, |target| {
                    partition.same_class(state, target)
                })
        };
        let filtered = SubMdp::new(mdp, drop_internal);
        let quotient = QuotientMdp::new(filtered, partition);

        // re-expose the rewards through the choice mappings
        let num_states = mdp.num_states();
        let state_rewards = (0..num_states).map(|state| rewards.state_reward(state)).collect();
        let transition_rewards = (0..num_states)
            .map(|state| {
                (0..quotient.num_choices(state))
                    .map(|choice| {
                        let (member, filtered_choice) = quotient.map_to_original(state, choice);
                        let original = quotient.inner().original_choice(member, filtered_choice);
                        rewards.transition_reward(member, original)
                    })
                    .collect()
            })
            .collect();
        let rewards = StateChoiceRewards::from_parts(state_rewards, transition_rewards)?;

        Ok(Some(ZeroRewardEcQuotient {
            quotient,
            rewards,
            fragment,
        }))
    }

    /// Returns the quotient model.
    pub fn model(&self) -> &QuotientMdp<SubMdp<'a, M>> {
        &self.quotient
    }

    /// Returns the reward structure of the quotient model.
    pub fn rewards(&self) -> &StateChoiceRewards {
        &self.rewards
    }

    /// Returns the partition collapsing the components.
    pub fn partition(&self) -> &Partition {
        self.quotient.partition()
    }

    /// Returns the zero-reward fragment the components were found in.
    pub fn fragment(&self) -> &SubMdp<'a, M> {
        &self.fragment
    }

    /// Returns the number of collapsed zero-reward end components.
    pub fn num_zmecs(&self) -> usize {
        self.quotient.partition().num_classes()
    }

    /// Returns the states that were collapsed into another state.
    pub fn non_representative_states(&self) -> BTreeSet<usize> {
        self.quotient.partition().non_representative_states()
    }

    /// Broadcasts the value computed for each representative to every member of
    /// its class, so downstream consumers see one value per original state.
    ///
    /// # Arguments
    ///
    /// - `solution` - one value per state, indexed by the original state space
    pub fn map_results(&self, solution: &mut [f64]) {
        let partition = self.quotient.partition();
        for state in 0..solution.len() {
            let representative = partition.map_to_representative(state);
            if representative != state {
                solution[state] = solution[representative];
            }
        }
    }

    /// Rewrites a scheduler computed on the quotient into a scheduler on the
    /// original model.
    ///
    /// The representative's decided choice is resolved to the class member and
    /// original choice it was lifted from; every other member of the class is
    /// pointed, through zero-reward choices only, toward that member with
    /// probability one. A representative left with a sentinel keeps it, except
    /// that an arbitrary marker is resolved to the state's first surviving
    /// zero-reward choice when it has one.
    ///
    /// # Arguments
    ///
    /// - `strategy` - on entry a scheduler in the quotient's index space, on
    ///   return a scheduler in the original model's index space
    pub fn lift_strategy(&self, strategy: &mut Strategy) -> Result<(), MdpError> {
        let partition = self.quotient.partition();
        for class_index in 0..partition.num_classes() {
            let representative = partition.representative_at(class_index);
            let class = partition.class_at(class_index);

            // resolve the chosen leaving choice into the original index space
            let raw = strategy.raw(representative);
            let (target, target_choice) = match self.quotient.map_raw_to_original(representative, raw)
            {
                Some((member, filtered_choice)) => {
                    let original = self.quotient.inner().original_choice(member, filtered_choice);
                    (member, original as i32)
                }
                None => (representative, raw),
            };

            // synthesize a probability-one route to the target inside the
            // zero-reward fragment
            let goal = BTreeSet::from([target]);
            let reached = prob1e(&self.fragment, class, &goal, Some(&mut *strategy));
            for &member in class {
                if !reached.contains(&member) {
                    return Err(MdpError::Certification {
                        class: class_index,
                        state: member,
                    });
                }
            }
            for &member in class {
                if member == target {
                    continue;
                }
                if let Some(choice) = strategy.choice(member) {
                    strategy.set(member, self.fragment.original_choice(member, choice));
                }
            }

            if target_choice >= 0 {
                strategy.set(target, target_choice as usize);
            } else if target_choice == ARBITRARY && !self.fragment.is_trap(target) {
                strategy.set(target, self.fragment.original_choice(target, 0));
            } else {
                strategy.set_raw(target, target_choice);
            }
            log::trace!(
                "lifted class {} of {} states through state {}",
                class_index,
                class.len(),
                target
            );
        }
        Ok(())
    }

    /// Renders the zero-reward fragment in graphviz dot format, one edge per
    /// transition labeled with the original choice index.
    pub fn fragment_dot(&self) -> String {
        let mut graph: DiGraph<usize, usize> = DiGraph::new();
        let nodes: Vec<_> = (0..self.fragment.num_states())
            .map(|state| graph.add_node(state))
            .collect();
        for state in 0..self.fragment.num_states() {
            for choice in 0..self.fragment.num_choices(state) {
                let original = self.fragment.original_choice(state, choice);
                for transition in self.fragment.successors(state, choice) {
                    graph.add_edge(nodes[state], nodes[transition.target], original);
                }
            }
        }
        format!("{}", Dot::new(&graph))
    }
}

/// Returns the states from which some scheduler collects no reward forever: the
/// greatest set of states in which a zero-reward choice exists whose successors
/// stay in the set.
///
/// If a strategy is supplied, a witness zero-reward choice, in the original
/// model's index space, is recorded for every state of the result.
///
/// # Arguments
///
/// - `mdp` - the model
/// - `rewards` - the reward structure of the model
/// - `strategy` - optional scheduler to record witness choices into
pub fn compute_zero_reward_strategy_states<M: Mdp, R: RewardModel>(
    mdp: &M,
    rewards: &R,
    mut strategy: Option<&mut Strategy>,
) -> BTreeSet<usize> {
    let drop_positive = |state: usize, choice: usize| {
        rewards.state_reward(state) > 0.0 || rewards.transition_reward(state, choice) > 0.0
    };
    let fragment = SubMdp::new(mdp, drop_positive);
    let all = mdp.reachable_states();

    let result = prob0e(&fragment, &all, &BTreeSet::new(), strategy.as_deref_mut());
    if let Some(strategy) = strategy {
        for &state in &result {
            if let Some(choice) = strategy.choice(state) {
                strategy.set(state, fragment.original_choice(state, choice));
            }
        }
    }
    result
}
