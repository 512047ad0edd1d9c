//! Cross-validation: the full stage sequence once per fold, then a
//! statistical reduction over the per-fold metrics.

use crate::core::errors::Result;
use crate::core::metric::{MetricValue, Sentinel};
use crate::core::types::{DatasetName, MinerSettings};
use crate::event_log::{EventLog, Fold, LogSplitter, ShuffleSplitter};
use crate::miners::Miner;
use crate::pipeline::stages::{keys, StageRunner};
use crate::pipeline::{Collaborators, PipelineConfig};
use crate::store::ResultStore;
use std::sync::Arc;

/// Run name for one fold of a run.
pub fn fold_run_name(run: &str, index: usize) -> String {
    format!("{run}-{index}")
}

/// Mean over the entries whose flag is set; NaN when none is.
pub fn masked_average(values: &[f64], ok: &[bool]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0.0;
    for (value, &is_ok) in values.iter().zip(ok) {
        if is_ok {
            sum += value;
            n += 1.0;
        }
    }
    sum / n
}

/// Mean over all entries; entries that failed to parse contribute zero to
/// the numerator while the denominator stays the fold count.
pub fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn total(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Wraps the stage sequence in a full run plus K fold runs and reduces the
/// fold metrics. Every run gets its own scoped pipeline instance, so each
/// worker thread is released when its run finishes.
pub struct CrossValidationAggregator {
    config: PipelineConfig,
    collaborators: Collaborators,
    splitter: Arc<dyn LogSplitter>,
    folds: usize,
}

impl CrossValidationAggregator {
    pub fn new(config: PipelineConfig, collaborators: Collaborators, folds: usize) -> Self {
        Self::with_splitter(config, collaborators, folds, Arc::new(ShuffleSplitter::new()))
    }

    pub fn with_splitter(
        config: PipelineConfig,
        collaborators: Collaborators,
        folds: usize,
        splitter: Arc<dyn LogSplitter>,
    ) -> Self {
        Self {
            config,
            collaborators,
            splitter,
            folds,
        }
    }

    fn say(&self, line: impl AsRef<str>) {
        self.collaborators.sink.message(line.as_ref());
    }

    /// Evaluate one (miner, dataset) pair: the full log first, then every
    /// fold, then the reduction. Only an interrupted worker propagates.
    pub fn evaluate(
        &self,
        miner: &Arc<dyn Miner>,
        settings: &MinerSettings,
        log: &EventLog,
        dataset: &DatasetName,
        run: &str,
        store: &mut ResultStore,
    ) -> Result<()> {
        {
            let runner = StageRunner::new(self.config.clone(), self.collaborators.clone());
            match runner.mine(miner, settings, log, dataset, run, store)? {
                None => {
                    self.say(
                        "WARNING - miner result is null, skipping all metrics, \
                         forwarding to k-fold performance",
                    );
                    self.record_null_model(store, dataset, run);
                }
                Some(model) => {
                    self.say("computing soundness");
                    let soundness = runner.soundness(miner, &model, dataset, run, store)?;
                    runner.complexity(miner, settings, &model, log, dataset, run, store, true)?;
                    if soundness.is_sound() {
                        self.say("model is sound, computing performance on full data");
                        runner.performance(&model, log, soundness, dataset, run, store)?;
                    }
                }
            }
        }

        self.k_fold(miner, settings, log, dataset, run, store)
    }

    fn k_fold(
        &self,
        miner: &Arc<dyn Miner>,
        settings: &MinerSettings,
        log: &EventLog,
        dataset: &DatasetName,
        run: &str,
        store: &mut ResultStore,
    ) -> Result<()> {
        for fold in self.splitter.split(log, self.folds) {
            self.say(format!("Start mining fold {}", fold.index));
            let fold_run = fold_run_name(run, fold.index);
            self.eval_fold(miner, settings, &fold, dataset, &fold_run, store)?;
        }

        self.say(format!(
            "Finished mining folds for run {run} on log {dataset}, computing average results"
        ));
        self.extract_cross_validation(store, dataset, run);
        Ok(())
    }

    fn eval_fold(
        &self,
        miner: &Arc<dyn Miner>,
        settings: &MinerSettings,
        fold: &Fold,
        dataset: &DatasetName,
        fold_run: &str,
        store: &mut ResultStore,
    ) -> Result<()> {
        let runner = StageRunner::new(self.config.clone(), self.collaborators.clone());

        let model = runner.mine(miner, settings, &fold.training, dataset, fold_run, store)?;
        let Some(model) = model else {
            self.say("WARNING - miner result is null, recording null results for this fold");
            self.record_null_model(store, dataset, fold_run);
            return Ok(());
        };

        runner.complexity(
            miner,
            settings,
            &model,
            &fold.training,
            dataset,
            fold_run,
            store,
            false,
        )?;

        let soundness = runner.soundness(miner, &model, dataset, fold_run, store)?;
        if soundness.is_sound() {
            self.say("fold is sound");
        } else {
            self.say("fold is not sound, skipping performance");
        }
        runner.performance(&model, &fold.evaluation, soundness, dataset, fold_run, store)?;

        self.say(format!("Finished fold {}", fold.index));
        Ok(())
    }

    /// Back-fill the metric slots of a run whose mining produced no model,
    /// so no aggregated slot is ever silently absent.
    fn record_null_model(&self, store: &mut ResultStore, dataset: &DatasetName, run: &str) {
        for metric in [
            keys::SIZE_NODE,
            keys::FITNESS,
            keys::PRECISION,
            keys::F_SCORE,
            keys::CONFORMANCE_UNIQUE,
            keys::CONFORMANCE_TOTAL,
            keys::CONFORMANCE_UNIQUE_FRAC,
            keys::CONFORMANCE_TOTAL_FRAC,
        ] {
            store.add_if_missing(dataset, run, metric, Sentinel::NullResult.into());
        }
    }

    fn extract_cross_validation(&self, store: &mut ResultStore, dataset: &DatasetName, run: &str) {
        let k = self.folds;
        let mut fitness = vec![0.0; k];
        let mut precision = vec![0.0; k];
        let mut f_score = vec![0.0; k];
        let mut conformance = vec![0.0; k];
        let mut mining_time = vec![0.0; k];
        let mut soundness = vec![0.0; k];
        let mut sizes = vec![0.0; k];
        let mut performance_ok = vec![true; k];

        for i in 0..k {
            let fold_run = fold_run_name(run, i);

            match store.get(dataset, &fold_run, keys::MINING_TIME).as_f64() {
                Some(value) => mining_time[i] = value,
                None => self.say(format!("mining time not defined for fold {i}")),
            }
            match store.get(dataset, &fold_run, keys::SIZE_NODE).as_f64() {
                Some(value) => sizes[i] = value,
                None => self.say(format!("size not defined for fold {i}")),
            }
            if store.get(dataset, &fold_run, keys::SOUNDNESS) == MetricValue::label("sound") {
                soundness[i] = 1.0;
            }
            match store.get(dataset, &fold_run, keys::FITNESS).as_f64() {
                Some(value) => fitness[i] = value,
                None => {
                    self.say(format!("fitness not defined for fold {i}"));
                    performance_ok[i] = false;
                }
            }
            match store.get(dataset, &fold_run, keys::PRECISION).as_f64() {
                Some(value) => precision[i] = value,
                None => {
                    self.say(format!("precision not defined for fold {i}"));
                    performance_ok[i] = false;
                }
            }
            match store.get(dataset, &fold_run, keys::F_SCORE).as_f64() {
                Some(value) => f_score[i] = value,
                None => {
                    self.say(format!("f-score not defined for fold {i}"));
                    performance_ok[i] = false;
                }
            }
            match store
                .get(dataset, &fold_run, keys::CONFORMANCE_TOTAL_FRAC)
                .as_f64()
            {
                Some(value) => conformance[i] = value,
                None => {
                    self.say(format!("conformance frac not defined for fold {i}"));
                    performance_ok[i] = false;
                }
            }

            self.say(format!("Got results for fold {i}"));
        }

        let masked = [
            ("fitness", &fitness),
            ("conformance", &conformance),
            ("precision", &precision),
            ("f-score", &f_score),
        ];
        for (name, values) in masked {
            store.add_result(
                dataset,
                run,
                &format!("average {k}-fold {name}"),
                MetricValue::Number(masked_average(values, &performance_ok)),
            );
        }
        store.add_result(
            dataset,
            run,
            &format!("average {k}-fold mining time"),
            MetricValue::Number(average(&mining_time)),
        );
        // a sum under an "average" name; consumers depend on the literal value
        store.add_result(
            dataset,
            run,
            &format!("average {k}-fold soundness"),
            MetricValue::Number(total(&soundness)),
        );
        store.add_result(
            dataset,
            run,
            &format!("average {k}-fold size"),
            MetricValue::Number(average(&sizes)),
        );

        let raw = [
            ("fitness", fitness),
            ("precision", precision),
            ("conformance", conformance),
            ("f-score", f_score),
            ("mining time", mining_time),
            ("soundness", soundness),
            ("size", sizes),
        ];
        for (name, values) in raw {
            store.add_result(
                dataset,
                run,
                &format!("scores {k}-fold {name}"),
                MetricValue::Series(values),
            );
        }

        self.say("Computed average results");
    }
}
