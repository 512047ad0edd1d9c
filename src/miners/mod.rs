//! Mining algorithms.
//!
//! A miner turns an event log into a marked Petri net. Diagram mining is an
//! optional capability; the complexity stage converts the net when a miner
//! does not provide it.

pub mod flower;
pub mod prefix_tree;

pub use flower::FlowerMiner;
pub use prefix_tree::PrefixTreeMiner;

use crate::core::errors::{Error, Result};
use crate::core::types::MinerSettings;
use crate::event_log::EventLog;
use crate::model::{Diagram, ProcessModel};
use std::sync::Arc;

/// Capability interface for mining algorithms, selected by acronym at
/// configuration time.
pub trait Miner: Send + Sync {
    /// Full algorithm name
    fn name(&self) -> &str;

    /// Short identifier used in run names and on the command line
    fn acronym(&self) -> &str;

    fn mine(&self, log: &EventLog, settings: &MinerSettings) -> Result<ProcessModel>;

    /// Whether `mine_diagram` is implemented
    fn supports_diagram(&self) -> bool {
        false
    }

    /// Native diagram mining, preferred over net conversion when available
    fn mine_diagram(&self, _log: &EventLog, _settings: &MinerSettings) -> Result<Diagram> {
        Err(Error::collaborator(format!(
            "{} has no diagram capability",
            self.acronym()
        )))
    }

    /// Whether the mined models are sound by construction. Short-circuits
    /// the soundness stage and the structuredness metric.
    fn sound_by_construction(&self) -> bool {
        false
    }
}

/// All built-in miners, in listing order.
pub fn available_miners() -> Vec<Arc<dyn Miner>> {
    vec![
        Arc::new(FlowerMiner::new()),
        Arc::new(PrefixTreeMiner::new()),
    ]
}

/// Resolve miner selectors: either a listing index or an acronym,
/// case-insensitive.
pub fn resolve_miners(selectors: &[String]) -> Result<Vec<Arc<dyn Miner>>> {
    let available = available_miners();
    let mut resolved = Vec::with_capacity(selectors.len());

    for selector in selectors {
        let found = if let Ok(index) = selector.parse::<usize>() {
            available.get(index).cloned()
        } else {
            available
                .iter()
                .find(|m| m.acronym().eq_ignore_ascii_case(selector))
                .cloned()
        };
        match found {
            Some(miner) => resolved.push(miner),
            None => return Err(Error::Config(format!("unknown miner: {selector}"))),
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_acronym_and_index() {
        let by_acronym = resolve_miners(&["flower".to_string()]).unwrap();
        assert_eq!(by_acronym[0].acronym(), "FLOWER");

        let by_index = resolve_miners(&["1".to_string()]).unwrap();
        assert_eq!(by_index[0].acronym(), "PTREE");
    }

    #[test]
    fn unknown_selector_is_an_error() {
        assert!(resolve_miners(&["nope".to_string()]).is_err());
    }
}
