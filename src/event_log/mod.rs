//! Event logs: ordered collections of traces, each an ordered sequence of
//! labeled events.

pub mod importer;
pub mod loader;
pub mod splitter;

pub use importer::import_from_file;
pub use loader::{discover_logs, load_log};
pub use splitter::{Fold, LogSplitter, ShuffleSplitter};

use std::collections::BTreeMap;

/// One recorded process execution as a sequence of event labels.
pub type Trace = Vec<String>;

/// A recorded event log.
///
/// Traces are plain label sequences; timestamps and attributes are resolved
/// away at import time. Cloning is cheap enough that every stage clones its
/// input log before handing it to a collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    name: String,
    traces: Vec<Trace>,
}

impl EventLog {
    pub fn new(name: impl Into<String>, traces: Vec<Trace>) -> Self {
        Self {
            name: name.into(),
            traces,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Number of traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Distinct event labels, sorted so miners stay deterministic.
    pub fn labels(&self) -> Vec<String> {
        self.traces
            .iter()
            .flatten()
            .cloned()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct trace variants with their occurrence counts.
    pub fn variants(&self) -> BTreeMap<Trace, usize> {
        let mut variants = BTreeMap::new();
        for trace in &self.traces {
            *variants.entry(trace.clone()).or_insert(0) += 1;
        }
        variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(events: &[&str]) -> Trace {
        events.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn variants_count_duplicates() {
        let log = EventLog::new(
            "t",
            vec![trace(&["a", "b"]), trace(&["a", "b"]), trace(&["a", "c"])],
        );
        let variants = log.variants();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[&trace(&["a", "b"])], 2);
        assert_eq!(variants[&trace(&["a", "c"])], 1);
    }

    #[test]
    fn labels_are_sorted_and_distinct() {
        let log = EventLog::new("t", vec![trace(&["c", "a"]), trace(&["b", "a"])]);
        assert_eq!(log.labels(), vec!["a", "b", "c"]);
    }
}
