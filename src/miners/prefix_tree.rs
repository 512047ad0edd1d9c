//! Prefix tree miner.
//!
//! Folds the log's traces into a prefix tree and lowers it to a Petri net:
//! every tree edge becomes a transition, every tree node a place, and
//! every node where a trace ends gets a silent path to the final place.

use crate::core::errors::Result;
use crate::core::types::MinerSettings;
use crate::event_log::EventLog;
use crate::miners::Miner;
use crate::model::ProcessModel;
use std::collections::BTreeMap;
use std::collections::VecDeque;

#[derive(Debug, Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
    terminal: bool,
}

impl TreeNode {
    fn insert(&mut self, trace: &[String]) {
        match trace.split_first() {
            None => self.terminal = true,
            Some((event, rest)) => self
                .children
                .entry(event.clone())
                .or_default()
                .insert(rest),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixTreeMiner;

impl PrefixTreeMiner {
    pub fn new() -> Self {
        Self
    }
}

impl Miner for PrefixTreeMiner {
    fn name(&self) -> &str {
        "PrefixTreeMiner"
    }

    fn acronym(&self) -> &str {
        "PTREE"
    }

    fn mine(&self, log: &EventLog, _settings: &MinerSettings) -> Result<ProcessModel> {
        let mut root = TreeNode::default();
        for trace in log.traces() {
            root.insert(trace);
        }

        let mut net = ProcessModel::new("net_from_tree");
        let start = net.add_place("start");
        let end = net.add_place("end");

        if root.terminal {
            net.add_tau(start, end);
        }

        // breadth-first lowering: each queued entry is a subtree plus the
        // transition that reaches it
        let mut queue = VecDeque::new();
        for (label, child) in &root.children {
            let t = net.add_transition(label.clone());
            net.add_arc(start, t);
            queue.push_back((child, t));
        }

        while let Some((node, reached_from)) = queue.pop_front() {
            let place = net.add_place(format!("place_{}", net.places().len()));
            net.add_arc(reached_from, place);
            if node.terminal {
                net.add_tau(place, end);
            }
            for (label, child) in &node.children {
                let t = net.add_transition(label.clone());
                net.add_arc(place, t);
                queue.push_back((child, t));
            }
        }

        net.mark(start, end);
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_prefixes_share_structure() {
        let log = EventLog::new(
            "t",
            vec![
                vec!["a".into(), "b".into()],
                vec!["a".into(), "c".into()],
            ],
        );
        let net = PrefixTreeMiner::new().mine(&log, &MinerSettings::new()).unwrap();
        // one "a" transition, then branches "b" and "c", each with a tau to end:
        // 3 labeled + 2 taus
        assert_eq!(net.transitions().len(), 5);
        assert_eq!(
            net.transitions()
                .iter()
                .filter(|&&t| net.transition_label(t) == Some("a"))
                .count(),
            1
        );
    }

    #[test]
    fn mined_net_replays_its_own_traces() {
        let log = EventLog::new("t", vec![vec!["a".into(), "b".into()]]);
        let net = PrefixTreeMiner::new().mine(&log, &MinerSettings::new()).unwrap();

        let mut marking = net.initial_marking();
        for event in &log.traces()[0] {
            let enabled = net.enabled_transitions(&marking);
            let t = enabled
                .into_iter()
                .find(|&t| net.transition_label(t) == Some(event))
                .expect("event transition enabled");
            marking = net.fire(&marking, t);
        }
        // one silent step reaches the final marking
        let tau = net
            .enabled_transitions(&marking)
            .into_iter()
            .find(|&t| net.transition_label(t).is_none())
            .expect("closing tau enabled");
        assert_eq!(net.fire(&marking, tau), net.final_marking());
    }
}
