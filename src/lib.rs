//!
//! `zmec` collapses the zero-reward end components of a Markov decision process
//! into single representative states, producing the quotient model that
//! expected-reward iteration needs in order to converge.
//!
//! > A scheduler caught in a cycle that costs nothing can spin forever; only
//! > once such cycles are collapsed do the expected-reward sums become finite.

/// End-component decomposition and qualitative reachability
pub mod analysis;
/// Models, rewards, schedulers and views
pub mod mdp;
/// The quotient construction
pub mod quotient;
