//! Collision-safe hierarchical result store with JSON persistence.
//!
//! Values live under dataset → algorithm run → metric. Inserting a metric
//! name that already exists never overwrites: the insert probes
//! `metric_1`, `metric_2`, … until a free slot is found. Reads never fail;
//! an absent dataset, run, or metric reads as the UNKNOWN sentinel.

use crate::core::metric::{MetricValue, Sentinel};
use crate::core::types::DatasetName;
use crate::diagnostics::{default_sink, SharedSink};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Nested result mapping, ordered at every level so serialized documents
/// diff cleanly.
pub type ResultsTree = BTreeMap<String, BTreeMap<String, BTreeMap<String, MetricValue>>>;

pub struct ResultStore {
    results: ResultsTree,
    sink: SharedSink,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::with_sink(default_sink())
    }

    pub fn with_sink(sink: SharedSink) -> Self {
        Self {
            results: ResultsTree::new(),
            sink,
        }
    }

    /// Insert a value. On a metric-name collision the value lands under the
    /// lowest unused `metric_<n>` suffix; the existing value stays put.
    pub fn add_result(
        &mut self,
        dataset: &DatasetName,
        run: &str,
        metric: &str,
        value: MetricValue,
    ) {
        self.sink.message(&format!(
            "Adding result: [{dataset}] run {run}, metric {metric}: {value}"
        ));

        let run_map = self
            .results
            .entry(dataset.as_str().to_string())
            .or_default()
            .entry(run.to_string())
            .or_default();

        if run_map.contains_key(metric) {
            self.sink.message(&format!(
                "WARNING - results already contain key for metric {metric}, adding suffix"
            ));
            let mut i = 1;
            loop {
                let candidate = format!("{metric}_{i}");
                if !run_map.contains_key(&candidate) {
                    run_map.insert(candidate, value);
                    break;
                }
                i += 1;
            }
        } else {
            run_map.insert(metric.to_string(), value);
        }
    }

    /// Insert a value together with its elapsed time under `metric-time`.
    pub fn add_result_timed(
        &mut self,
        dataset: &DatasetName,
        run: &str,
        metric: &str,
        value: MetricValue,
        elapsed_ms: i64,
    ) {
        self.add_result(dataset, run, metric, value);
        self.add_result(
            dataset,
            run,
            &format!("{metric}-time"),
            MetricValue::DurationMs(elapsed_ms),
        );
    }

    /// Write the value only if the current one reads as UNKNOWN.
    pub fn add_if_missing(
        &mut self,
        dataset: &DatasetName,
        run: &str,
        metric: &str,
        value: MetricValue,
    ) {
        if self.get(dataset, run, metric).is_unknown() {
            self.add_result(dataset, run, metric, value);
        }
    }

    /// Read a value. Never fails: any absent level reads as UNKNOWN.
    pub fn get(&self, dataset: &DatasetName, run: &str, metric: &str) -> MetricValue {
        self.results
            .get(dataset.as_str())
            .and_then(|runs| runs.get(run))
            .and_then(|metrics| metrics.get(metric))
            .cloned()
            .unwrap_or(MetricValue::Sentinel(Sentinel::Unknown))
    }

    pub fn snapshot(&self) -> &ResultsTree {
        &self.results
    }

    /// Serialize the whole store. Failures are logged and swallowed; a
    /// caller that needs durability must verify the file out-of-band.
    pub fn write_json(&self, path: &Path) {
        if let Err(err) = self.try_write(path, &self.results) {
            self.sink
                .message(&format!("ERROR - writing results to {}: {err}", path.display()));
        }
    }

    /// Serialize one dataset's slice of the store.
    pub fn write_json_dataset(&self, path: &Path, dataset: &DatasetName) {
        let empty = BTreeMap::new();
        let slice = self.results.get(dataset.as_str()).unwrap_or(&empty);
        if let Err(err) = self.try_write(path, slice) {
            self.sink
                .message(&format!("ERROR - writing results to {}: {err}", path.display()));
        }
    }

    fn try_write<T: serde::Serialize>(&self, path: &Path, value: &T) -> crate::core::Result<()> {
        // full buffer first, then a single write
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}
