//! Benchmark configuration.
//!
//! A `BenchmarkConfig` can be loaded from a TOML file; command-line flags
//! override whatever the file sets.

use crate::core::errors::{Error, Result};
use crate::core::types::ParameterRange;
use crate::pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const HOUR_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Folder scanned for event logs
    pub log_folder: PathBuf,
    /// Directory the result documents are written to
    pub output_dir: PathBuf,
    /// Deadline for one mining submission, in milliseconds
    pub miner_timeout_ms: u64,
    /// Deadline for one metric submission, in milliseconds
    pub metric_timeout_ms: u64,
    /// Number of cross-validation folds
    pub folds: usize,
    /// Thread-count hint forwarded to the fitness collaborator
    pub fitness_threads: usize,
    /// Pause after the performance stage, in milliseconds
    pub settle_delay_ms: u64,
    /// Optional sweep over one miner setting
    pub parameter_range: Option<ParameterRange>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            log_folder: PathBuf::from("."),
            output_dir: PathBuf::from("./results"),
            miner_timeout_ms: HOUR_MS,
            metric_timeout_ms: HOUR_MS,
            folds: 5,
            fitness_threads: 1,
            settle_delay_ms: 5000,
            parameter_range: None,
        }
    }
}

impl BenchmarkConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// The per-pipeline slice of this configuration.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            miner_timeout: Duration::from_millis(self.miner_timeout_ms),
            metric_timeout: Duration::from_millis(self.metric_timeout_ms),
            fitness_threads: self.fitness_threads,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    #[test]
    fn loads_partial_toml_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            "{}",
            indoc! {r#"
                folds = 3
                metric_timeout_ms = 120000

                [parameter_range]
                name = "noise"
                start = 0.1
                stop = 0.5
                step = 0.2
            "#}
        )
        .unwrap();
        drop(file);

        let config = BenchmarkConfig::load(&path).unwrap();
        assert_eq!(config.folds, 3);
        assert_eq!(config.metric_timeout_ms, 120_000);
        assert_eq!(config.miner_timeout_ms, HOUR_MS);
        assert_eq!(config.parameter_range.unwrap().name, "noise");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "folds = \"many\"").unwrap();
        assert!(BenchmarkConfig::load(&path).is_err());
    }

    #[test]
    fn pipeline_slice_converts_durations() {
        let config = BenchmarkConfig {
            miner_timeout_ms: 1500,
            ..Default::default()
        };
        assert_eq!(config.pipeline().miner_timeout, Duration::from_millis(1500));
    }
}
