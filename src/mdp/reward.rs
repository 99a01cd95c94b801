use crate::mdp::model::MdpError;

/// Represents a reward structure over an MDP: a non-negative reward per state and
/// a non-negative reward per choice. Transition rewards are uniform across the
/// successors of a choice; reward sources with per-successor granularity must be
/// folded through [`StateChoiceRewards::from_transition_rewards`], which rejects
/// non-uniform choices.
pub trait RewardModel {
    /// Returns the reward collected in the given state.
    fn state_reward(&self, state: usize) -> f64;

    /// Returns the reward collected by taking the given choice.
    fn transition_reward(&self, state: usize, choice: usize) -> f64;

    /// Returns true if the structure carries any transition rewards at all.
    fn has_transition_rewards(&self) -> bool;
}

/// A dense vector-backed reward structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChoiceRewards {
    state_rewards: Vec<f64>,
    transition_rewards: Vec<Vec<f64>>,
}

impl StateChoiceRewards {
    /// Creates a reward structure that assigns zero everywhere.
    pub fn zero(num_states: usize) -> Self {
        StateChoiceRewards {
            state_rewards: vec![0.0; num_states],
            transition_rewards: Vec::new(),
        }
    }

    /// Creates a reward structure from per-state and per-choice reward vectors.
    /// An empty `transition_rewards` vector denotes a structure without
    /// transition rewards. All rewards must be non-negative.
    ///
    /// # Arguments
    ///
    /// - `state_rewards` - one reward per state
    /// - `transition_rewards` - one reward per state and choice, or empty
    pub fn from_parts(
        state_rewards: Vec<f64>,
        transition_rewards: Vec<Vec<f64>>,
    ) -> Result<Self, MdpError> {
        for (state, &reward) in state_rewards.iter().enumerate() {
            if reward < 0.0 {
                return Err(MdpError::NegativeStateReward { state });
            }
        }
        for (state, rewards) in transition_rewards.iter().enumerate() {
            for (choice, &reward) in rewards.iter().enumerate() {
                if reward < 0.0 {
                    return Err(MdpError::NegativeTransitionReward { state, choice });
                }
            }
        }

        Ok(StateChoiceRewards {
            state_rewards,
            transition_rewards,
        })
    }

    /// Creates a reward structure from a source with per-successor granularity,
    /// one reward per state, choice and successor. The successor rewards of every
    /// choice must agree; a choice whose successors carry different rewards is
    /// rejected with [`MdpError::NonUniformReward`].
    ///
    /// # Arguments
    ///
    /// - `state_rewards` - one reward per state
    /// - `successor_rewards` - per state and choice, one reward per successor
    pub fn from_transition_rewards(
        state_rewards: Vec<f64>,
        successor_rewards: Vec<Vec<Vec<f64>>>,
    ) -> Result<Self, MdpError> {
        let mut transition_rewards = Vec::with_capacity(successor_rewards.len());
        for (state, choices) in successor_rewards.iter().enumerate() {
            let mut rewards = Vec::with_capacity(choices.len());
            for (choice, successors) in choices.iter().enumerate() {
                let reward = successors.first().copied().unwrap_or(0.0);
                if successors.iter().any(|&r| r != reward) {
                    return Err(MdpError::NonUniformReward { state, choice });
                }
                rewards.push(reward);
            }
            transition_rewards.push(rewards);
        }

        Self::from_parts(state_rewards, transition_rewards)
    }
}

impl RewardModel for StateChoiceRewards {
    fn state_reward(&self, state: usize) -> f64 {
        self.state_rewards[state]
    }

    fn transition_reward(&self, state: usize, choice: usize) -> f64 {
        if self.transition_rewards.is_empty() {
            0.0
        } else {
            self.transition_rewards[state][choice]
        }
    }

    fn has_transition_rewards(&self) -> bool {
        !self.transition_rewards.is_empty()
    }
}
