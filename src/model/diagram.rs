//! BPMN-like diagrams used by the structural complexity metrics.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;

/// Routing behavior of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    /// Exclusive choice (XOR)
    Exclusive,
    /// Parallel split/join (AND)
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramNode {
    Start,
    End,
    Activity(String),
    Gateway(GatewayKind),
}

/// A process diagram: activities and gateways connected by sequence flows.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    name: String,
    graph: StableDiGraph<DiagramNode, ()>,
}

impl Diagram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: StableDiGraph::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_start(&mut self) -> NodeIndex {
        self.graph.add_node(DiagramNode::Start)
    }

    pub fn add_end(&mut self) -> NodeIndex {
        self.graph.add_node(DiagramNode::End)
    }

    pub fn add_activity(&mut self, label: impl Into<String>) -> NodeIndex {
        self.graph.add_node(DiagramNode::Activity(label.into()))
    }

    pub fn add_gateway(&mut self, kind: GatewayKind) -> NodeIndex {
        self.graph.add_node(DiagramNode::Gateway(kind))
    }

    pub fn add_flow(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&DiagramNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn flow_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().collect()
    }

    pub fn gateways(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| matches!(self.node(idx), Some(DiagramNode::Gateway(_))))
            .collect()
    }

    pub fn gateway_kind(&self, idx: NodeIndex) -> Option<GatewayKind> {
        match self.node(idx) {
            Some(DiagramNode::Gateway(kind)) => Some(*kind),
            _ => None,
        }
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .count()
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .count()
    }

    pub fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect()
    }

    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect()
    }

    pub fn remove_node(&mut self, idx: NodeIndex) {
        self.graph.remove_node(idx);
    }

    /// Number of parallel flows between two nodes.
    pub fn flows_between(&self, from: NodeIndex, to: NodeIndex) -> usize {
        self.graph.edges_connecting(from, to).count()
    }

    /// Remove one flow between two nodes, if any.
    pub fn remove_flow(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_follow_flows() {
        let mut diagram = Diagram::new("d");
        let start = diagram.add_start();
        let split = diagram.add_gateway(GatewayKind::Exclusive);
        let a = diagram.add_activity("a");
        let b = diagram.add_activity("b");
        let end = diagram.add_end();
        diagram.add_flow(start, split);
        diagram.add_flow(split, a);
        diagram.add_flow(split, b);
        diagram.add_flow(a, end);
        diagram.add_flow(b, end);

        assert_eq!(diagram.node_count(), 5);
        assert_eq!(diagram.flow_count(), 5);
        assert_eq!(diagram.out_degree(split), 2);
        assert_eq!(diagram.in_degree(end), 2);
        assert_eq!(diagram.gateways(), vec![split]);
    }
}
