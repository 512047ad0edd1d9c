//! Escaping-edges precision.
//!
//! Every replay state contributes the labels the model would allow next
//! versus the labels the log actually took from it. Precision is one minus
//! the trace-weighted escaping fraction.

use crate::core::errors::Result;
use crate::event_log::EventLog;
use crate::metrics::replay::{tau_closure, ReplayResult};
use crate::metrics::PrecisionEvaluator;
use crate::model::{Marking, ProcessModel};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, Copy)]
pub struct EscapingEdges;

impl EscapingEdges {
    pub fn new() -> Self {
        Self
    }
}

struct PrefixState {
    weight: usize,
    taken: BTreeSet<String>,
    marking: Marking,
}

impl PrefixState {
    fn at(marking: Marking) -> Self {
        Self {
            weight: 0,
            taken: BTreeSet::new(),
            marking,
        }
    }
}

/// Distinct labels the model allows from a marking, silent moves included.
fn allowed_labels(model: &ProcessModel, marking: &Marking) -> BTreeSet<String> {
    let mut budget = 10_000;
    let mut exhausted = false;
    let mut labels = BTreeSet::new();
    for closed in tau_closure(model, marking, &mut budget, &mut exhausted) {
        for t in model.enabled_transitions(&closed) {
            if let Some(label) = model.transition_label(t) {
                labels.insert(label.to_string());
            }
        }
    }
    labels
}

impl PrecisionEvaluator for EscapingEdges {
    fn precision(
        &self,
        _log: &EventLog,
        model: &ProcessModel,
        replay: &ReplayResult,
    ) -> Result<f64> {
        // prefix-automaton state -> trace weight, labels the log continues
        // with, and the model marking reached after the prefix
        let mut states: BTreeMap<Vec<String>, PrefixState> = BTreeMap::new();
        for variant in &replay.variants {
            let mut prefix: Vec<String> = Vec::new();
            for (marking, label) in &variant.steps {
                let state = states
                    .entry(prefix.clone())
                    .or_insert_with(|| PrefixState::at(marking.clone()));
                state.weight += variant.traces;
                state.taken.insert(label.clone());
                prefix.push(label.clone());
            }
        }

        if states.is_empty() {
            return Ok(0.0);
        }

        let mut allowed_total = 0.0;
        let mut escaping_total = 0.0;
        for state in states.values() {
            let allowed = allowed_labels(model, &state.marking);
            let escaping = allowed.difference(&state.taken).count();
            allowed_total += (state.weight * allowed.len()) as f64;
            escaping_total += (state.weight * escaping) as f64;
        }

        if allowed_total == 0.0 {
            return Ok(1.0);
        }
        Ok(1.0 - escaping_total / allowed_total)
    }
}
