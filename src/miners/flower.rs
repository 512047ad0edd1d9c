//! Flower model miner.
//!
//! Produces the maximally permissive model: one central place with a loop
//! transition per distinct event label. Useful as a fitness upper bound and
//! precision lower bound for any log.

use crate::core::errors::Result;
use crate::core::types::MinerSettings;
use crate::event_log::EventLog;
use crate::miners::Miner;
use crate::model::{Diagram, GatewayKind, ProcessModel};

#[derive(Debug, Default, Clone, Copy)]
pub struct FlowerMiner;

impl FlowerMiner {
    pub fn new() -> Self {
        Self
    }
}

impl Miner for FlowerMiner {
    fn name(&self) -> &str {
        "FlowerModelMiner"
    }

    fn acronym(&self) -> &str {
        "FLOWER"
    }

    fn mine(&self, log: &EventLog, _settings: &MinerSettings) -> Result<ProcessModel> {
        let mut net = ProcessModel::new("flower_net");
        let start = net.add_place("start");
        let center = net.add_place("center");
        let end = net.add_place("end");

        net.add_tau(start, center);
        net.add_tau(center, end);

        for label in log.labels() {
            let t = net.add_transition(label);
            net.add_arc(center, t);
            net.add_arc(t, center);
        }

        net.mark(start, end);
        Ok(net)
    }

    fn supports_diagram(&self) -> bool {
        true
    }

    fn mine_diagram(&self, log: &EventLog, _settings: &MinerSettings) -> Result<Diagram> {
        let mut diagram = Diagram::new("bpmn_flower");
        let start = diagram.add_start();
        let end = diagram.add_end();
        let split = diagram.add_gateway(GatewayKind::Exclusive);
        let join = diagram.add_gateway(GatewayKind::Exclusive);

        diagram.add_flow(start, join);
        diagram.add_flow(join, split);
        diagram.add_flow(split, end);

        for label in log.labels() {
            let activity = diagram.add_activity(label);
            diagram.add_flow(split, activity);
            diagram.add_flow(activity, join);
        }

        Ok(diagram)
    }
}
