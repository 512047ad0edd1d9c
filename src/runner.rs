//! Benchmark driver: iterates miners over logs, runs the cross-validation
//! pipeline per pair, and writes the result documents.

use crate::config::BenchmarkConfig;
use crate::core::errors::Result;
use crate::core::types::{DatasetName, MinerSettings};
use crate::event_log::{discover_logs, load_log};
use crate::miners::Miner;
use crate::pipeline::{Collaborators, CrossValidationAggregator};
use crate::store::ResultStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::sync::Arc;

pub struct Benchmark {
    config: BenchmarkConfig,
    collaborators: Collaborators,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self::with_collaborators(config, Collaborators::default())
    }

    pub fn with_collaborators(config: BenchmarkConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    fn say(&self, line: impl AsRef<str>) {
        self.collaborators.sink.message(line.as_ref());
    }

    /// Evaluate every miner against every log in the configured folder.
    /// One pair failing to load or aborting never stops the others.
    pub fn run(&self, miners: &[Arc<dyn Miner>]) -> Result<()> {
        self.say("loaded miners:");
        for miner in miners {
            self.say(format!("({}) - {}", miner.acronym(), miner.name()));
        }

        fs::create_dir_all(&self.config.output_dir)?;
        let log_paths = discover_logs(&self.config.log_folder)?;
        for path in &log_paths {
            self.say(format!("found log: {}", path.display()));
        }

        let progress = ProgressBar::new((miners.len() * log_paths.len()) as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut store = ResultStore::with_sink(self.collaborators.sink.clone());

        for miner in miners {
            self.say(format!(
                "Evaluating miner {} ({})",
                miner.name(),
                miner.acronym()
            ));
            let miner_dir = self.config.output_dir.join(miner.acronym());
            fs::create_dir_all(&miner_dir)?;

            for log_path in &log_paths {
                let log = match load_log(log_path) {
                    Ok(log) => log,
                    Err(err) => {
                        self.say(format!("ERROR - could not load log, moving on: {err}"));
                        progress.inc(1);
                        continue;
                    }
                };
                let dataset = DatasetName::new(log.name());
                progress.set_message(format!("{} / {}", miner.acronym(), log.name()));
                self.say(format!("evaluating log: {}", log.name()));

                for (run_name, settings) in self.run_variants(miner.as_ref()) {
                    let aggregator = CrossValidationAggregator::new(
                        self.config.pipeline(),
                        self.collaborators.clone(),
                        self.config.folds,
                    );
                    if let Err(err) =
                        aggregator.evaluate(miner, &settings, &log, &dataset, &run_name, &mut store)
                    {
                        self.say(format!("ERROR - {err}, stopping this pair"));
                    }
                }

                let file = miner_dir.join(format!("{}_{}.json", current_time(), log.name()));
                store.write_json_dataset(&file, &dataset);
                self.say(format!(
                    "finished mining log {} with miner {}",
                    log.name(),
                    miner.acronym()
                ));
                progress.inc(1);
            }
        }

        progress.finish_and_clear();
        let combined = self
            .config
            .output_dir
            .join(format!("benchmark_{}.json", current_time()));
        store.write_json(&combined);
        Ok(())
    }

    /// Run names and settings for one miner: either the plain acronym, or
    /// one variant per swept parameter value.
    fn run_variants(&self, miner: &dyn Miner) -> Vec<(String, MinerSettings)> {
        match &self.config.parameter_range {
            None => vec![(miner.acronym().to_string(), MinerSettings::new())],
            Some(range) => range
                .values()
                .into_iter()
                .map(|value| {
                    (
                        range.run_name(miner.acronym(), value),
                        MinerSettings::new().with(&range.name, value),
                    )
                })
                .collect(),
        }
    }
}

fn current_time() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ParameterRange;
    use crate::miners::FlowerMiner;

    #[test]
    fn plain_config_yields_one_variant() {
        let benchmark = Benchmark::new(BenchmarkConfig::default());
        let variants = benchmark.run_variants(&FlowerMiner::new());
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].0, "FLOWER");
    }

    #[test]
    fn parameter_range_yields_one_variant_per_value() {
        let config = BenchmarkConfig {
            parameter_range: Some(ParameterRange::new("noise", 0.2, 0.6, 0.2)),
            ..Default::default()
        };
        let benchmark = Benchmark::new(config);
        let variants = benchmark.run_variants(&FlowerMiner::new());
        let names: Vec<&str> = variants.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["FLOWER_20", "FLOWER_40", "FLOWER_60"]);
        assert_eq!(variants[1].1.get("noise"), Some(0.4));
    }
}
