use crate::mdp::model::Mdp;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeSet;

/// Computes the maximal end components of an MDP restricted to a set of states.
///
/// An end component is a set of states together with a non-empty selection of
/// choices per state such that every selected choice stays inside the set and
/// the induced graph is strongly connected. The computer runs the standard
/// removal loop: compute the strongly connected components of the restricted
/// graph, discard every choice whose image escapes its component, discard every
/// state left without choices, and repeat until nothing changes. The worst case
/// is quadratic in the size of the restricted sub-MDP.
pub struct EcComputer<'a, M: Mdp> {
    mdp: &'a M,
}

impl<'a, M: Mdp> EcComputer<'a, M> {
    pub fn new(mdp: &'a M) -> Self {
        EcComputer { mdp }
    }

    /// Returns the maximal end components of the sub-MDP induced by the given
    /// states, as disjoint state sets ordered by their smallest member. States
    /// outside the model are ignored.
    ///
    /// # Arguments
    ///
    /// - `restriction` - the states the decomposition is confined to
    pub fn maximal_end_components(&self, restriction: &BTreeSet<usize>) -> Vec<BTreeSet<usize>> {
        let num_states = self.mdp.num_states();
        let mut alive = vec![false; num_states];
        for &state in restriction {
            if state < num_states {
                alive[state] = true;
            }
        }

        // remaining candidate choices per state
        let mut choices: Vec<Vec<usize>> = (0..num_states)
            .map(|state| {
                if alive[state] {
                    (0..self.mdp.num_choices(state)).collect()
                } else {
                    Vec::new()
                }
            })
            .collect();

        let mut round = 0usize;
        loop {
            round += 1;
            let graph = self.restricted_graph(&alive, &choices);
            let components = tarjan_scc(&graph);

            let mut component_of = vec![usize::MAX; num_states];
            for (index, component) in components.iter().enumerate() {
                for &node in component {
                    component_of[graph[node]] = index;
                }
            }

            // discard choices escaping their component, then choiceless states
            let mut changed = false;
            for state in 0..num_states {
                if !alive[state] {
                    continue;
                }
                let before = choices[state].len();
                choices[state].retain(|&choice| {
                    self.mdp.all_successors_match(state, choice, |target| {
                        alive[target] && component_of[target] == component_of[state]
                    })
                });
                if choices[state].len() != before {
                    changed = true;
                }
                if choices[state].is_empty() {
                    alive[state] = false;
                    changed = true;
                }
            }
            log::trace!(
                "end-component round {} over {} candidate states",
                round,
                graph.node_count()
            );

            if !changed {
                // every remaining component is closed under its remaining choices
                let mut result: Vec<BTreeSet<usize>> = components
                    .iter()
                    .map(|component| component.iter().map(|&node| graph[node]).collect())
                    .collect();
                result.sort();
                log::debug!("found {} maximal end components", result.len());
                return result;
            }
        }
    }

    fn restricted_graph(&self, alive: &[bool], choices: &[Vec<usize>]) -> DiGraph<usize, ()> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let mut index: Vec<Option<NodeIndex>> = vec![None; alive.len()];
        for (state, &is_alive) in alive.iter().enumerate() {
            if is_alive {
                index[state] = Some(graph.add_node(state));
            }
        }
        for (state, remaining) in choices.iter().enumerate() {
            let Some(source) = index[state] else { continue };
            for &choice in remaining {
                for transition in self.mdp.successors(state, choice) {
                    if let Some(target) = index[transition.target] {
                        graph.add_edge(source, target, ());
                    }
                }
            }
        }
        graph
    }
}
