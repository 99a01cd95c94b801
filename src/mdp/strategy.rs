use crate::mdp::model::Mdp;
use rand::Rng;

/// Sentinel for a state without a decided choice.
pub const UNKNOWN: i32 = -1;

/// Sentinel for a state where any choice is optimal. Strategy lifting may
/// resolve it to the first available choice of the state.
pub const ARBITRARY: i32 = -2;

/// Represents a memoryless scheduler: a mapping from each state to a choice
/// index, or to one of the sentinels [`UNKNOWN`] and [`ARBITRARY`]. The choice
/// indices are interpreted relative to some model or view; lifting procedures
/// rewrite them between index spaces.
///
/// # Examples
///
/// ```
/// use zmec::mdp::strategy::{Strategy, UNKNOWN};
///
/// let mut strategy = Strategy::unknown(3);
/// strategy.set(1, 4);
///
/// assert_eq!(strategy.choice(0), None);
/// assert_eq!(strategy.choice(1), Some(4));
/// assert_eq!(strategy.raw(2), UNKNOWN);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    choices: Vec<i32>,
}

impl Strategy {
    /// Creates a strategy with every state undecided.
    pub fn unknown(num_states: usize) -> Self {
        Strategy {
            choices: vec![UNKNOWN; num_states],
        }
    }

    /// Creates a uniform at random strategy for the given model. Trap states
    /// remain undecided.
    ///
    /// # Arguments
    ///
    /// - `mdp` - the model whose choice indices the strategy refers to
    pub fn random<M: Mdp>(mdp: &M) -> Self {
        let mut rng = rand::thread_rng();
        let choices = (0..mdp.num_states())
            .map(|state| match mdp.num_choices(state) {
                0 => UNKNOWN,
                n => rng.gen_range(0..n) as i32,
            })
            .collect();
        Strategy { choices }
    }

    /// Returns the number of states the strategy covers.
    pub fn num_states(&self) -> usize {
        self.choices.len()
    }

    /// Returns the decided choice of the given state, or None for a sentinel.
    pub fn choice(&self, state: usize) -> Option<usize> {
        match self.choices[state] {
            value if value >= 0 => Some(value as usize),
            _ => None,
        }
    }

    /// Returns the raw entry of the given state, sentinels included.
    pub fn raw(&self, state: usize) -> i32 {
        self.choices[state]
    }

    /// Returns true if the given state has a decided choice.
    pub fn is_decided(&self, state: usize) -> bool {
        self.choices[state] >= 0
    }

    /// Assigns a choice to the given state.
    pub fn set(&mut self, state: usize, choice: usize) {
        self.choices[state] = choice as i32;
    }

    /// Assigns a raw entry, sentinel or choice, to the given state.
    pub fn set_raw(&mut self, state: usize, value: i32) {
        self.choices[state] = value;
    }
}
