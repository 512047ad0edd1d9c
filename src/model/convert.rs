//! Petri net to diagram conversion.

use crate::core::errors::{Error, Result};
use crate::model::diagram::{Diagram, GatewayKind};
use crate::model::petri::ProcessModel;
use petgraph::stable_graph::NodeIndex;
use std::collections::HashMap;

/// Derives a BPMN-like diagram from a mined model. Used by the complexity
/// stage when the miner has no native diagram capability.
pub trait DiagramConverter: Send + Sync {
    fn to_diagram(&self, model: &ProcessModel) -> Result<Diagram>;
}

/// Structural conversion:
/// labeled transitions become activities, silent transitions become
/// exclusive gateways, branching places become exclusive gateways, and
/// transitions with several input or output places get parallel connectors.
/// Places on a plain sequence are elided.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralConverter;

impl StructuralConverter {
    pub fn new() -> Self {
        Self
    }
}

struct TransitionNodes {
    entry: NodeIndex,
    exit: NodeIndex,
}

impl DiagramConverter for StructuralConverter {
    fn to_diagram(&self, model: &ProcessModel) -> Result<Diagram> {
        let initial = model.initial_marking();
        let fin = model.final_marking();
        if initial.is_empty() || fin.is_empty() {
            return Err(Error::collaborator("model has no initial or final marking"));
        }

        let mut diagram = Diagram::new(format!("{}_bpmn", model.name()));

        // Transitions first: every transition is present in the diagram,
        // with parallel connectors around multi-place joins and splits.
        let mut transition_nodes: HashMap<NodeIndex, TransitionNodes> = HashMap::new();
        for t in model.transitions() {
            let main = match model.transition_label(t) {
                Some(label) => diagram.add_activity(label),
                None => diagram.add_gateway(GatewayKind::Exclusive),
            };
            let entry = if model.inputs(t).len() > 1 {
                let join = diagram.add_gateway(GatewayKind::Parallel);
                diagram.add_flow(join, main);
                join
            } else {
                main
            };
            let exit = if model.outputs(t).len() > 1 {
                let split = diagram.add_gateway(GatewayKind::Parallel);
                diagram.add_flow(main, split);
                split
            } else {
                main
            };
            transition_nodes.insert(t, TransitionNodes { entry, exit });
        }

        // Places: marked places become start/end events, branching places
        // become exclusive gateways, sequence places are elided.
        let mut place_nodes: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        for p in model.places() {
            let ins = model.inputs(p).len();
            let outs = model.outputs(p).len();
            let mapped = if initial.contains_key(&p) {
                Some(diagram.add_start())
            } else if fin.contains_key(&p) {
                Some(diagram.add_end())
            } else if ins > 1 || outs > 1 {
                Some(diagram.add_gateway(GatewayKind::Exclusive))
            } else {
                None
            };
            if let Some(node) = mapped {
                place_nodes.insert(p, node);
            }
        }

        for p in model.places() {
            match place_nodes.get(&p) {
                Some(&node) => {
                    for t in model.inputs(p) {
                        if let Some(nodes) = transition_nodes.get(&t) {
                            diagram.add_flow(nodes.exit, node);
                        }
                    }
                    for t in model.outputs(p) {
                        if let Some(nodes) = transition_nodes.get(&t) {
                            diagram.add_flow(node, nodes.entry);
                        }
                    }
                }
                None => {
                    // elided sequence place: connect its transitions directly
                    for from in model.inputs(p) {
                        for to in model.outputs(p) {
                            if let (Some(from), Some(to)) =
                                (transition_nodes.get(&from), transition_nodes.get(&to))
                            {
                                diagram.add_flow(from.exit, to.entry);
                            }
                        }
                    }
                }
            }
        }

        Ok(diagram)
    }
}
