//! Soundness checking by bounded state-space exploration.

use crate::core::errors::{Error, Result};
use crate::metrics::SoundnessChecker;
use crate::model::{Marking, ProcessModel};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Explores the reachability graph of the marked net and checks the three
/// classical soundness conditions: option to complete, proper completion,
/// and no dead transitions.
///
/// The exploration is budgeted. A marking with more tokens on one place
/// than `token_bound` marks the net unbounded, which is unsound; exceeding
/// `max_states` is reported as an error because no verdict was reached.
#[derive(Debug, Clone)]
pub struct StateSpaceChecker {
    max_states: usize,
    token_bound: usize,
}

impl Default for StateSpaceChecker {
    fn default() -> Self {
        Self {
            max_states: 16_384,
            token_bound: 8,
        }
    }
}

impl StateSpaceChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(max_states: usize, token_bound: usize) -> Self {
        Self {
            max_states,
            token_bound,
        }
    }
}

impl SoundnessChecker for StateSpaceChecker {
    fn is_sound(&self, model: &ProcessModel) -> Result<bool> {
        let initial = model.initial_marking();
        let fin = model.final_marking();
        if initial.is_empty() || fin.is_empty() {
            return Err(Error::collaborator("model has no initial or final marking"));
        }

        // forward exploration
        let mut edges: BTreeMap<Marking, Vec<Marking>> = BTreeMap::new();
        let mut fired: BTreeSet<petgraph::stable_graph::NodeIndex> = BTreeSet::new();
        let mut seen: BTreeSet<Marking> = BTreeSet::new();
        let mut queue = VecDeque::new();
        seen.insert(initial.clone());
        queue.push_back(initial);

        while let Some(marking) = queue.pop_front() {
            for transition in model.enabled_transitions(&marking) {
                let next = model.fire(&marking, transition);
                if next.values().any(|&tokens| tokens > self.token_bound) {
                    // unbounded behavior can never complete properly
                    return Ok(false);
                }
                fired.insert(transition);
                edges.entry(marking.clone()).or_default().push(next.clone());
                if seen.insert(next.clone()) {
                    if seen.len() > self.max_states {
                        return Err(Error::collaborator("state space budget exceeded"));
                    }
                    queue.push_back(next);
                }
            }
        }

        // proper completion: no reachable marking strictly covers the final one
        for marking in &seen {
            let covers = fin
                .iter()
                .all(|(place, &tokens)| marking.get(place).copied().unwrap_or(0) >= tokens);
            if covers && *marking != fin {
                return Ok(false);
            }
        }

        // option to complete: the final marking must be reachable from
        // every reachable marking (backward closure from the final marking)
        if !seen.contains(&fin) {
            return Ok(false);
        }
        let mut reaches_final: BTreeSet<&Marking> = BTreeSet::new();
        reaches_final.insert(&fin);
        let mut grew = true;
        while grew {
            grew = false;
            for (from, tos) in &edges {
                if reaches_final.contains(from) {
                    continue;
                }
                if tos.iter().any(|to| reaches_final.contains(to)) {
                    reaches_final.insert(from);
                    grew = true;
                }
            }
        }
        if seen.iter().any(|m| !reaches_final.contains(m)) {
            return Ok(false);
        }

        // no dead transitions
        Ok(model.transitions().iter().all(|t| fired.contains(t)))
    }
}
