//! Petri nets with initial and final markings.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::BTreeMap;

/// A node of the net: a place holding tokens or a transition firing events.
/// A transition without a label is silent (tau).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetriNode {
    Place(String),
    Transition(Option<String>),
}

/// Multiset of tokens per place.
pub type Marking = BTreeMap<NodeIndex, usize>;

/// A mined process model: a Petri net plus its initial and final marking.
#[derive(Debug, Clone, Default)]
pub struct ProcessModel {
    name: String,
    graph: StableDiGraph<PetriNode, ()>,
    initial: Vec<NodeIndex>,
    fin: Vec<NodeIndex>,
}

impl ProcessModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_place(&mut self, name: impl Into<String>) -> NodeIndex {
        self.graph.add_node(PetriNode::Place(name.into()))
    }

    pub fn add_transition(&mut self, label: impl Into<String>) -> NodeIndex {
        self.graph.add_node(PetriNode::Transition(Some(label.into())))
    }

    /// Add a silent transition connecting two places.
    pub fn add_tau(&mut self, from: NodeIndex, to: NodeIndex) -> NodeIndex {
        let tau = self.graph.add_node(PetriNode::Transition(None));
        self.graph.add_edge(from, tau, ());
        self.graph.add_edge(tau, to, ());
        tau
    }

    pub fn add_arc(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
    }

    /// Set the initial and final marking, one token on each given place.
    pub fn mark(&mut self, start: NodeIndex, end: NodeIndex) {
        self.initial = vec![start];
        self.fin = vec![end];
    }

    pub fn initial_marking(&self) -> Marking {
        let mut marking = Marking::new();
        for &place in &self.initial {
            *marking.entry(place).or_insert(0) += 1;
        }
        marking
    }

    pub fn final_marking(&self) -> Marking {
        let mut marking = Marking::new();
        for &place in &self.fin {
            *marking.entry(place).or_insert(0) += 1;
        }
        marking
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&PetriNode> {
        self.graph.node_weight(idx)
    }

    pub fn is_transition(&self, idx: NodeIndex) -> bool {
        matches!(self.node(idx), Some(PetriNode::Transition(_)))
    }

    /// Label of a transition; `None` for places and silent transitions.
    pub fn transition_label(&self, idx: NodeIndex) -> Option<&str> {
        match self.node(idx) {
            Some(PetriNode::Transition(Some(label))) => Some(label.as_str()),
            _ => None,
        }
    }

    pub fn transitions(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.is_transition(idx))
            .collect()
    }

    pub fn places(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| !self.is_transition(idx))
            .collect()
    }

    pub fn inputs(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect()
    }

    pub fn outputs(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// A transition is enabled when every input place holds a token.
    pub fn is_enabled(&self, marking: &Marking, transition: NodeIndex) -> bool {
        self.inputs(transition)
            .iter()
            .all(|place| marking.get(place).copied().unwrap_or(0) > 0)
    }

    /// Fire an enabled transition, consuming from inputs and producing to
    /// outputs. The caller is responsible for checking enablement first.
    pub fn fire(&self, marking: &Marking, transition: NodeIndex) -> Marking {
        let mut next = marking.clone();
        for place in self.inputs(transition) {
            if let Some(tokens) = next.get_mut(&place) {
                *tokens -= 1;
                if *tokens == 0 {
                    next.remove(&place);
                }
            }
        }
        for place in self.outputs(transition) {
            *next.entry(place).or_insert(0) += 1;
        }
        next
    }

    /// Transitions enabled under a marking.
    pub fn enabled_transitions(&self, marking: &Marking) -> Vec<NodeIndex> {
        self.transitions()
            .into_iter()
            .filter(|&t| self.is_enabled(marking, t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence_net() -> (ProcessModel, NodeIndex, NodeIndex) {
        let mut net = ProcessModel::new("seq");
        let start = net.add_place("start");
        let mid = net.add_place("mid");
        let end = net.add_place("end");
        let a = net.add_transition("a");
        let b = net.add_transition("b");
        net.add_arc(start, a);
        net.add_arc(a, mid);
        net.add_arc(mid, b);
        net.add_arc(b, end);
        net.mark(start, end);
        (net, a, b)
    }

    #[test]
    fn firing_moves_tokens() {
        let (net, a, b) = sequence_net();
        let m0 = net.initial_marking();
        assert!(net.is_enabled(&m0, a));
        assert!(!net.is_enabled(&m0, b));

        let m1 = net.fire(&m0, a);
        assert!(net.is_enabled(&m1, b));
        let m2 = net.fire(&m1, b);
        assert_eq!(m2, net.final_marking());
    }

    #[test]
    fn tau_transitions_have_no_label() {
        let mut net = ProcessModel::new("tau");
        let p = net.add_place("p");
        let q = net.add_place("q");
        let tau = net.add_tau(p, q);
        assert!(net.is_transition(tau));
        assert_eq!(net.transition_label(tau), None);
    }
}
