/// Equivalence partitions of the state space
pub mod partition;
/// Collapsed quotient views
pub mod view;
/// The zero-reward end-component quotient
pub mod zero;
