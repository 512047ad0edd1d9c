//! Structural complexity metrics over a process diagram.

use crate::core::errors::{Error, Result};
use crate::model::{Diagram, DiagramNode, GatewayKind};
use std::sync::OnceLock;

/// Computes the structural metrics of one diagram. The connector-density
/// array is computed once and shared by the min/max/mean/median metrics.
pub struct ComplexityCalculator {
    diagram: Diagram,
    densities: OnceLock<Vec<i64>>,
}

impl ComplexityCalculator {
    pub fn new(diagram: Diagram) -> Self {
        Self {
            diagram,
            densities: OnceLock::new(),
        }
    }

    /// Sorted connector densities: in-degree plus out-degree per gateway.
    fn densities(&self) -> &[i64] {
        self.densities.get_or_init(|| {
            let mut densities: Vec<i64> = self
                .diagram
                .gateways()
                .into_iter()
                .map(|g| (self.diagram.in_degree(g) + self.diagram.out_degree(g)) as i64)
                .collect();
            densities.sort_unstable();
            densities
        })
    }

    pub fn size(&self) -> f64 {
        self.diagram.node_count() as f64
    }

    pub fn flow_size(&self) -> f64 {
        self.diagram.flow_count() as f64
    }

    pub fn connector_size(&self) -> f64 {
        self.diagram.gateways().len() as f64
    }

    pub fn min_connector_density(&self) -> Result<f64> {
        self.densities()
            .first()
            .map(|&d| d as f64)
            .ok_or_else(|| Error::collaborator("diagram has no connectors"))
    }

    pub fn max_connector_density(&self) -> Result<f64> {
        self.densities()
            .last()
            .map(|&d| d as f64)
            .ok_or_else(|| Error::collaborator("diagram has no connectors"))
    }

    /// Mean density; NaN for a connector-free diagram.
    pub fn mean_connector_density(&self) -> f64 {
        let densities = self.densities();
        let sum: i64 = densities.iter().sum();
        sum as f64 / densities.len() as f64
    }

    pub fn median_connector_density(&self) -> Result<f64> {
        let densities = self.densities();
        if densities.is_empty() {
            return Err(Error::collaborator("diagram has no connectors"));
        }
        let n = densities.len();
        let idx = (n - 1) / 2;
        if n % 2 == 0 {
            Ok((densities[idx] + densities[idx + 1]) as f64 / 2.0)
        } else {
            Ok(densities[idx] as f64)
        }
    }

    /// Coefficient of network connectivity: flows over nodes.
    pub fn cnc(&self) -> f64 {
        self.flow_size() / self.size()
    }

    /// Control-flow complexity: exclusive splits weigh one per outgoing
    /// branch, parallel splits weigh one.
    pub fn cfc(&self) -> f64 {
        let mut total = 0usize;
        for gateway in self.diagram.gateways() {
            let out = self.diagram.out_degree(gateway);
            if out <= 1 {
                continue;
            }
            match self.diagram.gateway_kind(gateway) {
                Some(GatewayKind::Exclusive) => total += out,
                Some(GatewayKind::Parallel) => total += 1,
                None => {}
            }
        }
        total as f64
    }

    /// Fraction of the diagram covered by well-structured regions,
    /// measured by reducing sequences, parallel bands, and loop pairs
    /// until a fixpoint. A fully reducible diagram scores 1.0.
    pub fn structuredness(&self) -> f64 {
        let mut g = self.diagram.clone();
        let original = g.node_count();

        loop {
            if !reduce_once(&mut g) {
                break;
            }
        }

        let remaining = g.node_count();
        if original <= 2 {
            return 1.0;
        }
        let unreduced = remaining.saturating_sub(2) as f64;
        (1.0 - unreduced / (original - 2) as f64).clamp(0.0, 1.0)
    }
}

/// Apply one reduction step; true when anything changed.
fn reduce_once(g: &mut Diagram) -> bool {
    // sequence rule: drop an inner node with exactly one flow in and out
    for node in g.nodes() {
        if matches!(g.node(node), Some(DiagramNode::Start) | Some(DiagramNode::End)) {
            continue;
        }
        if g.in_degree(node) == 1 && g.out_degree(node) == 1 {
            let pred = g.predecessors(node)[0];
            let succ = g.successors(node)[0];
            if pred != node && succ != node {
                g.remove_node(node);
                g.add_flow(pred, succ);
                return true;
            }
        }
    }

    // band rule: parallel flows between the same pair collapse to one
    for node in g.nodes() {
        for succ in g.successors(node) {
            if succ != node && g.flows_between(node, succ) > 1 {
                g.remove_flow(node, succ);
                return true;
            }
        }
    }

    // loop rule: a mutual gateway pair keeps the forward flow only. The
    // back edge is the one pointing into the loop's entry, recognized by
    // its predecessor outside the pair.
    for node in g.nodes() {
        if g.gateway_kind(node).is_none() {
            continue;
        }
        for succ in g.successors(node) {
            if succ == node
                || g.gateway_kind(succ).is_none()
                || g.flows_between(succ, node) == 0
            {
                continue;
            }
            let node_is_entry = g.predecessors(node).iter().any(|&p| p != succ);
            let succ_is_entry = g.predecessors(succ).iter().any(|&p| p != node);
            if succ_is_entry && !node_is_entry {
                g.remove_flow(node, succ);
            } else {
                g.remove_flow(succ, node);
            }
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_join_diagram() -> Diagram {
        let mut d = Diagram::new("d");
        let start = d.add_start();
        let split = d.add_gateway(GatewayKind::Exclusive);
        let a = d.add_activity("a");
        let b = d.add_activity("b");
        let join = d.add_gateway(GatewayKind::Exclusive);
        let end = d.add_end();
        d.add_flow(start, split);
        d.add_flow(split, a);
        d.add_flow(split, b);
        d.add_flow(a, join);
        d.add_flow(b, join);
        d.add_flow(join, end);
        d
    }

    #[test]
    fn counts_and_densities() {
        let calc = ComplexityCalculator::new(split_join_diagram());
        assert_eq!(calc.size(), 6.0);
        assert_eq!(calc.flow_size(), 6.0);
        assert_eq!(calc.connector_size(), 2.0);
        // both gateways have density 3
        assert_eq!(calc.min_connector_density().unwrap(), 3.0);
        assert_eq!(calc.max_connector_density().unwrap(), 3.0);
        assert_eq!(calc.mean_connector_density(), 3.0);
        assert_eq!(calc.median_connector_density().unwrap(), 3.0);
    }

    #[test]
    fn median_of_even_count_averages_the_middle_pair() {
        let mut d = Diagram::new("d");
        let start = d.add_start();
        let g1 = d.add_gateway(GatewayKind::Exclusive);
        let g2 = d.add_gateway(GatewayKind::Exclusive);
        let a = d.add_activity("a");
        let b = d.add_activity("b");
        let end = d.add_end();
        d.add_flow(start, g1);
        d.add_flow(g1, a);
        d.add_flow(g1, b);
        d.add_flow(g1, end);
        d.add_flow(a, g2);
        d.add_flow(b, g2);
        d.add_flow(g2, end);
        // densities sorted: [3, 4] -> median 3.5
        let calc = ComplexityCalculator::new(d);
        assert_eq!(calc.median_connector_density().unwrap(), 3.5);
    }

    #[test]
    fn connector_free_diagram_errors_on_min_density() {
        let mut d = Diagram::new("d");
        let start = d.add_start();
        let a = d.add_activity("a");
        let end = d.add_end();
        d.add_flow(start, a);
        d.add_flow(a, end);

        let calc = ComplexityCalculator::new(d);
        assert!(calc.min_connector_density().is_err());
        assert!(calc.mean_connector_density().is_nan());
    }

    #[test]
    fn cfc_weighs_exclusive_splits_by_fan_out() {
        let calc = ComplexityCalculator::new(split_join_diagram());
        // one exclusive split with two branches; the join contributes nothing
        assert_eq!(calc.cfc(), 2.0);
    }

    #[test]
    fn structured_diagram_scores_one() {
        let calc = ComplexityCalculator::new(split_join_diagram());
        assert_eq!(calc.structuredness(), 1.0);
    }

    #[test]
    fn flower_diagram_is_fully_structured() {
        use crate::core::types::MinerSettings;
        use crate::event_log::EventLog;
        use crate::miners::{FlowerMiner, Miner};

        let log = EventLog::new("t", vec![vec!["a".into(), "b".into(), "c".into()]]);
        let diagram = FlowerMiner::new()
            .mine_diagram(&log, &MinerSettings::new())
            .unwrap();
        let calc = ComplexityCalculator::new(diagram);
        assert_eq!(calc.structuredness(), 1.0);
    }
}
