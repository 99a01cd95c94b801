use crate::mdp::model::Mdp;
use crate::mdp::strategy::{Strategy, UNKNOWN};
use std::collections::BTreeSet;

/// Returns the states from which some scheduler stays in `remain` and never
/// enters `avoid`, with probability one.
///
/// Computed as the greatest fixed point of the operator keeping a state if some
/// choice leads all its successors back into the current set, starting from
/// `remain` without `avoid`. If a strategy is supplied, a witness choice is
/// recorded for every state of the result; states outside the result are left
/// untouched.
///
/// # Arguments
///
/// - `mdp` - the model
/// - `remain` - the states the scheduler is allowed to visit
/// - `avoid` - the states the scheduler must never enter
/// - `strategy` - optional scheduler to record witness choices into
pub fn prob0e<M: Mdp>(
    mdp: &M,
    remain: &BTreeSet<usize>,
    avoid: &BTreeSet<usize>,
    strategy: Option<&mut Strategy>,
) -> BTreeSet<usize> {
    let num_states = mdp.num_states();
    let mut inside = vec![false; num_states];
    for &state in remain {
        if state < num_states && !avoid.contains(&state) {
            inside[state] = true;
        }
    }

    loop {
        let mut changed = false;
        for state in 0..num_states {
            if !inside[state] {
                continue;
            }
            let closed = (0..mdp.num_choices(state))
                .any(|choice| mdp.all_successors_match(state, choice, |target| inside[target]));
            if !closed {
                inside[state] = false;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    if let Some(strategy) = strategy {
        for state in 0..num_states {
            if !inside[state] {
                continue;
            }
            let witness = (0..mdp.num_choices(state))
                .find(|&choice| mdp.all_successors_match(state, choice, |target| inside[target]));
            if let Some(choice) = witness {
                strategy.set(state, choice);
            }
        }
    }

    (0..num_states).filter(|&state| inside[state]).collect()
}

/// Returns the states from which some scheduler reaches `goal` while staying in
/// `remain`, with probability one.
///
/// Computed as a nested fixed point: the outer loop shrinks the set of states
/// still considered possible, the inner loop grows the attractor of `goal`
/// through choices that stay inside the outer set. If a strategy is supplied,
/// the witness choices of the final attractor pass are recorded for every state
/// of the result that is not a goal state; all other entries are left untouched.
///
/// # Arguments
///
/// - `mdp` - the model
/// - `remain` - the states the scheduler is allowed to pass through
/// - `goal` - the states to reach
/// - `strategy` - optional scheduler to record witness choices into
pub fn prob1e<M: Mdp>(
    mdp: &M,
    remain: &BTreeSet<usize>,
    goal: &BTreeSet<usize>,
    strategy: Option<&mut Strategy>,
) -> BTreeSet<usize> {
    let num_states = mdp.num_states();
    let mut outer = vec![false; num_states];
    for &state in remain.iter().chain(goal.iter()) {
        if state < num_states {
            outer[state] = true;
        }
    }

    let mut witness = vec![UNKNOWN; num_states];
    loop {
        // attractor of the goal through choices confined to the outer set
        let mut inner = vec![false; num_states];
        for &state in goal {
            if state < num_states && outer[state] {
                inner[state] = true;
            }
        }
        for entry in witness.iter_mut() {
            *entry = UNKNOWN;
        }

        loop {
            let mut changed = false;
            for state in 0..num_states {
                if inner[state] || !outer[state] {
                    continue;
                }
                for choice in 0..mdp.num_choices(state) {
                    let stays = mdp.all_successors_match(state, choice, |target| outer[target]);
                    let progresses = mdp
                        .successors(state, choice)
                        .iter()
                        .any(|transition| inner[transition.target]);
                    if stays && progresses {
                        inner[state] = true;
                        witness[state] = choice as i32;
                        changed = true;
                        break;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        if inner == outer {
            break;
        }
        outer = inner;
    }

    if let Some(strategy) = strategy {
        for state in 0..num_states {
            if outer[state] && !goal.contains(&state) && witness[state] >= 0 {
                strategy.set_raw(state, witness[state]);
            }
        }
    }

    (0..num_states).filter(|&state| outer[state]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::sparse::SparseMdp;

    #[test]
    fn prob0e_keeps_states_with_a_closed_choice() {
        // state 0 may loop on itself forever or fall into the bad state 1
        let mut mdp = SparseMdp::with_states(2);
        mdp.add_choice(0, &[(0, 1.0)]).unwrap();
        mdp.add_choice(0, &[(1, 1.0)]).unwrap();
        mdp.add_choice(1, &[(1, 1.0)]).unwrap();

        let remain = BTreeSet::from([0, 1]);
        let avoid = BTreeSet::from([1]);
        let mut strategy = Strategy::unknown(2);

        let result = prob0e(&mdp, &remain, &avoid, Some(&mut strategy));

        assert_eq!(result, BTreeSet::from([0]));
        assert_eq!(strategy.choice(0), Some(0));
        assert_eq!(strategy.raw(1), UNKNOWN);
    }

    #[test]
    fn prob0e_drains_chains_into_the_avoid_set() {
        // every path from 0 and 1 eventually enters 2
        let mut mdp = SparseMdp::with_states(3);
        mdp.add_choice(0, &[(1, 1.0)]).unwrap();
        mdp.add_choice(1, &[(2, 1.0)]).unwrap();
        mdp.add_choice(2, &[(2, 1.0)]).unwrap();

        let remain = BTreeSet::from([0, 1, 2]);
        let avoid = BTreeSet::from([2]);

        assert!(prob0e(&mdp, &remain, &avoid, None).is_empty());
    }

    #[test]
    fn prob0e_respects_remain() {
        let mut mdp = SparseMdp::with_states(2);
        mdp.add_choice(0, &[(0, 1.0)]).unwrap();
        mdp.add_choice(1, &[(1, 1.0)]).unwrap();

        let remain = BTreeSet::from([0]);

        assert_eq!(
            prob0e(&mdp, &remain, &BTreeSet::new(), None),
            BTreeSet::from([0])
        );
    }

    #[test]
    fn prob1e_certifies_cycles_reaching_the_goal() {
        // a zero-probability-of-never cycle: 0 -> 1 -> 2 with 2 the goal
        let mut mdp = SparseMdp::with_states(3);
        mdp.add_choice(0, &[(1, 1.0)]).unwrap();
        mdp.add_choice(1, &[(2, 1.0)]).unwrap();
        mdp.add_choice(2, &[(0, 1.0)]).unwrap();

        let remain = BTreeSet::from([0, 1, 2]);
        let goal = BTreeSet::from([2]);
        let mut strategy = Strategy::unknown(3);

        let result = prob1e(&mdp, &remain, &goal, Some(&mut strategy));

        assert_eq!(result, BTreeSet::from([0, 1, 2]));
        assert_eq!(strategy.choice(0), Some(0));
        assert_eq!(strategy.choice(1), Some(0));
        // goal entries are never written
        assert_eq!(strategy.raw(2), UNKNOWN);
    }

    #[test]
    fn prob1e_rejects_states_that_may_diverge() {
        // the coin flip at state 0 may leak into the sink 2, which cannot
        // come back, so only the goal itself is certified
        let mut mdp = SparseMdp::with_states(3);
        mdp.add_choice(0, &[(1, 0.5), (2, 0.5)]).unwrap();
        mdp.add_choice(1, &[(1, 1.0)]).unwrap();
        mdp.add_choice(2, &[(2, 1.0)]).unwrap();

        let remain = BTreeSet::from([0, 1, 2]);
        let goal = BTreeSet::from([1]);

        assert_eq!(
            prob1e(&mdp, &remain, &goal, None),
            BTreeSet::from([1])
        );
    }

    #[test]
    fn prob1e_accepts_probabilistic_progress() {
        // state 0 flips a coin between the goal and itself; it still reaches
        // the goal with probability one
        let mut mdp = SparseMdp::with_states(2);
        mdp.add_choice(0, &[(0, 0.5), (1, 0.5)]).unwrap();
        mdp.add_choice(1, &[(1, 1.0)]).unwrap();

        let remain = BTreeSet::from([0, 1]);
        let goal = BTreeSet::from([1]);
        let mut strategy = Strategy::unknown(2);

        let result = prob1e(&mdp, &remain, &goal, Some(&mut strategy));

        assert_eq!(result, BTreeSet::from([0, 1]));
        assert_eq!(strategy.choice(0), Some(0));
    }

    #[test]
    fn prob1e_confines_paths_to_remain() {
        // reaching the goal is only possible through state 1, which is not
        // allowed to be visited
        let mut mdp = SparseMdp::with_states(3);
        mdp.add_choice(0, &[(1, 1.0)]).unwrap();
        mdp.add_choice(1, &[(2, 1.0)]).unwrap();
        mdp.add_choice(2, &[(2, 1.0)]).unwrap();

        let remain = BTreeSet::from([0]);
        let goal = BTreeSet::from([2]);

        assert_eq!(
            prob1e(&mdp, &remain, &goal, None),
            BTreeSet::from([2])
        );
    }
}
