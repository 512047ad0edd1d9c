//! Common type definitions used across the benchmark

use crate::core::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Name of one evaluated event log. Wrapped so a dataset name cannot be
/// confused with a run name or a metric name in store calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetName(String);

impl DatasetName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Soundness of one pipeline run. Starts unknown, set exactly once by the
/// soundness stage, and thereafter gates the performance stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundnessStatus {
    #[default]
    Unknown,
    Sound,
    Unsound,
}

impl SoundnessStatus {
    pub fn is_sound(&self) -> bool {
        matches!(self, SoundnessStatus::Sound)
    }
}

/// Named float parameters handed to a miner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinerSettings {
    params: BTreeMap<String, f64>,
}

impl MinerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.params.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}

/// One named miner setting swept over `start..=stop` in `step` increments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub name: String,
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl ParameterRange {
    pub fn new(name: impl Into<String>, start: f64, stop: f64, step: f64) -> Self {
        Self {
            name: name.into(),
            start,
            stop,
            step,
        }
    }

    /// Swept values, inclusive of `stop` up to float rounding
    pub fn values(&self) -> Vec<f64> {
        let mut values = Vec::new();
        let mut value = self.start;
        while value <= self.stop + 1e-9 {
            values.push(value);
            value += self.step;
        }
        values
    }

    /// Run name for one swept value, e.g. `FLOWER_50` for 0.5
    pub fn run_name(&self, acronym: &str, value: f64) -> String {
        format!("{}_{}", acronym, (value * 100.0) as i64)
    }
}

/// Parse a timeout argument. Plain integers are milliseconds, an `h` suffix
/// means hours.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let parsed = if let Some(hours) = input.strip_suffix('h') {
        hours
            .parse::<u64>()
            .map(|h| Duration::from_millis(h * 60 * 60 * 1000))
    } else {
        input.parse::<u64>().map(Duration::from_millis)
    };
    parsed.map_err(|_| Error::Config(format!("invalid duration: {input}")))
}
