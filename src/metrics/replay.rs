//! Replay-based fitness.
//!
//! Each distinct trace variant is replayed over the marked net with a
//! bounded beam search over markings; silent transitions are crossed via a
//! budgeted tau-closure. A variant that exhausts its search budget is
//! flagged unreliable rather than failed.

use crate::core::errors::Result;
use crate::event_log::{EventLog, Trace};
use crate::metrics::FitnessEvaluator;
use crate::model::{Marking, ProcessModel};
use std::collections::{BTreeSet, VecDeque};

/// Replay of one distinct trace variant.
#[derive(Debug, Clone)]
pub struct VariantReplay {
    /// How many traces in the log share this variant
    pub traces: usize,
    /// 1.0 when the variant replays completely and reaches the final marking
    pub fitness: f64,
    /// False when the search budget ran out before a verdict
    pub reliable: bool,
    /// (marking, fired label) pairs observed during replay; precision
    /// samples escaping edges from these states
    pub steps: Vec<(Marking, String)>,
}

impl VariantReplay {
    pub fn is_perfect(&self) -> bool {
        self.fitness >= 0.999
    }
}

/// Replay of a whole log: one entry per distinct trace variant.
#[derive(Debug, Clone, Default)]
pub struct ReplayResult {
    pub variants: Vec<VariantReplay>,
}

impl ReplayResult {
    /// Number of distinct trace variants
    pub fn unique_size(&self) -> usize {
        self.variants.len()
    }

    /// Number of traces across all variants
    pub fn total_size(&self) -> usize {
        self.variants.iter().map(|v| v.traces).sum()
    }

    /// Trace-weighted mean fitness over the reliable variants
    pub fn trace_fitness(&self) -> f64 {
        let mut weighted = 0.0;
        let mut total = 0usize;
        for variant in self.variants.iter().filter(|v| v.reliable) {
            weighted += variant.fitness * variant.traces as f64;
            total += variant.traces;
        }
        if total == 0 {
            0.0
        } else {
            weighted / total as f64
        }
    }
}

/// Token replay with a bounded search.
#[derive(Debug, Clone)]
pub struct TokenReplay {
    beam_width: usize,
    max_expansions: usize,
}

impl Default for TokenReplay {
    fn default() -> Self {
        Self {
            beam_width: 64,
            max_expansions: 10_000,
        }
    }
}

impl TokenReplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(beam_width: usize, max_expansions: usize) -> Self {
        Self {
            beam_width,
            max_expansions,
        }
    }

    fn replay_variant(
        &self,
        model: &ProcessModel,
        trace: &Trace,
        count: usize,
        fin: &Marking,
    ) -> VariantReplay {
        let mut budget = self.max_expansions;
        let mut exhausted = false;
        let mut beam = vec![model.initial_marking()];
        let mut matched = 0usize;
        let mut steps = Vec::new();

        for event in trace {
            let mut next = Vec::new();
            let mut seen = BTreeSet::new();
            let mut step_marking: Option<Marking> = None;
            for marking in &beam {
                for closed in tau_closure(model, marking, &mut budget, &mut exhausted) {
                    for t in model.enabled_transitions(&closed) {
                        if model.transition_label(t) != Some(event.as_str()) {
                            continue;
                        }
                        step_marking.get_or_insert_with(|| closed.clone());
                        let fired = model.fire(&closed, t);
                        if seen.insert(fired.clone()) && next.len() < self.beam_width {
                            next.push(fired);
                        }
                    }
                }
            }
            let Some(step_marking) = step_marking else {
                break;
            };
            // one state sample per matched event; precision replays the
            // prefix from these
            steps.push((step_marking, event.clone()));
            beam = next;
            matched += 1;
        }

        let complete = matched == trace.len()
            && beam.iter().any(|m| {
                tau_closure(model, m, &mut budget, &mut exhausted).contains(fin)
            });
        let fitness = (matched + usize::from(complete)) as f64 / (trace.len() + 1) as f64;

        VariantReplay {
            traces: count,
            fitness,
            reliable: !exhausted,
            steps,
        }
    }
}

impl FitnessEvaluator for TokenReplay {
    fn replay(
        &self,
        model: &ProcessModel,
        log: &EventLog,
        _threads: usize,
    ) -> Result<Option<ReplayResult>> {
        if log.is_empty() {
            return Ok(None);
        }

        let fin = model.final_marking();
        let variants = log
            .variants()
            .into_iter()
            .map(|(trace, count)| self.replay_variant(model, &trace, count, &fin))
            .collect();
        Ok(Some(ReplayResult { variants }))
    }
}

/// All markings reachable from `marking` by firing only silent transitions,
/// including the marking itself. Decrements the shared budget per expansion.
pub(crate) fn tau_closure(
    model: &ProcessModel,
    marking: &Marking,
    budget: &mut usize,
    exhausted: &mut bool,
) -> Vec<Marking> {
    let mut closure = BTreeSet::new();
    closure.insert(marking.clone());
    let mut queue = VecDeque::new();
    queue.push_back(marking.clone());

    while let Some(current) = queue.pop_front() {
        if *budget == 0 {
            *exhausted = true;
            break;
        }
        *budget -= 1;
        for t in model.enabled_transitions(&current) {
            if model.transition_label(t).is_some() {
                continue;
            }
            let next = model.fire(&current, t);
            if closure.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }

    closure.into_iter().collect()
}
