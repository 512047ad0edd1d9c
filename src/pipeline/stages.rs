//! The four pipeline stages over one (miner, dataset) pair.
//!
//! Each stage translates collaborator outcomes into stored metric values or
//! sentinels; only an interrupted worker aborts the remaining sequence.

use crate::core::errors::{Error, Result};
use crate::core::metric::{MetricValue, Sentinel};
use crate::core::types::{DatasetName, MinerSettings, SoundnessStatus};
use crate::event_log::EventLog;
use crate::metrics::{ComplexityCalculator, ReplayResult};
use crate::miners::Miner;
use crate::model::{Diagram, ProcessModel};
use crate::pipeline::{Collaborators, PipelineConfig};
use crate::store::ResultStore;
use crate::worker::{BoundedWorker, Outcome};
use std::sync::Arc;
use std::time::Instant;

/// Metric names written by the stages.
pub mod keys {
    pub const MINING_TIME: &str = "mining-time";
    pub const MINING_TIME_DIAGRAM: &str = "mining-time-bpmn";

    pub const SOUNDNESS: &str = "base-soundness";

    pub const FITNESS: &str = "performance-fitness";
    pub const PRECISION: &str = "performance-precision";
    pub const F_SCORE: &str = "performance-f-score";
    pub const PERFORMANCE_TYPE: &str = "_performanceType";

    pub const CONFORMANCE_UNIQUE: &str = "performance-unique-conformance";
    pub const CONFORMANCE_UNIQUE_FRAC: &str = "performance-unique-conformance-frac";
    pub const CONFORMANCE_TOTAL: &str = "performance-total-conformance";
    pub const CONFORMANCE_TOTAL_FRAC: &str = "performance-total-conformance-frac";
    pub const PERFORMANCE_UNIQUE_SIZE: &str = "performance-metric-unique-traces";
    pub const PERFORMANCE_TOTAL_SIZE: &str = "performance-metric-total-traces";

    pub const DEBUG_LOG_SIZE: &str = "debug-log-size";
    pub const DEBUG_REPLAY_SIZE: &str = "debug-replay-size";
    pub const DEBUG_REPLAY_CORRECT: &str = "debug-replay-correct";

    pub const SIZE_NODE: &str = "size-node";
    pub const SIZE_ARC: &str = "size-arc";
    pub const SIZE_CONNECTORS: &str = "size-connectors";
    pub const SIZE_DENSITY_MIN: &str = "size-density-min";
    pub const SIZE_DENSITY_MAX: &str = "size-density-max";
    pub const SIZE_DENSITY_MEAN: &str = "size-density-mean";
    pub const SIZE_DENSITY_MEDIAN: &str = "size-density-median";
    pub const SIZE_CNC: &str = "size-cnc";
    pub const SIZE_CFC: &str = "size-cfc";
    pub const STRUCTUREDNESS: &str = "structuredness";

    /// Complexity metrics in computation order, structuredness excluded.
    pub const COMPLEXITY: &[&str] = &[
        SIZE_NODE,
        SIZE_ARC,
        SIZE_CONNECTORS,
        SIZE_DENSITY_MIN,
        SIZE_DENSITY_MAX,
        SIZE_DENSITY_MEAN,
        SIZE_DENSITY_MEDIAN,
        SIZE_CNC,
        SIZE_CFC,
    ];
}

/// Runs the stage sequence for one (miner, dataset) pair. Owns the bounded
/// worker for its lifetime; dropping the runner shuts the worker down.
pub struct StageRunner {
    worker: BoundedWorker,
    config: PipelineConfig,
    collaborators: Collaborators,
}

impl StageRunner {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        Self {
            worker: BoundedWorker::new(),
            config,
            collaborators,
        }
    }

    fn say(&self, line: impl AsRef<str>) {
        self.collaborators.sink.message(line.as_ref());
    }

    /// Release the worker early. Stage calls made afterwards abort.
    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }

    fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            std::thread::sleep(self.config.settle_delay);
        }
    }

    /// Mine stage. `None` means the miner produced nothing usable within
    /// its deadline; downstream stages are skipped by the caller.
    pub fn mine(
        &self,
        miner: &Arc<dyn Miner>,
        settings: &MinerSettings,
        log: &EventLog,
        dataset: &DatasetName,
        run: &str,
        store: &mut ResultStore,
    ) -> Result<Option<ProcessModel>> {
        let mining_log = log.clone();
        let job_miner = Arc::clone(miner);
        let job_settings = settings.clone();

        let start = Instant::now();
        let outcome = self.worker.run(self.config.miner_timeout, move |_| {
            job_miner.mine(&mining_log, &job_settings)
        });

        let result = match outcome {
            Outcome::Completed(Ok(model)) => {
                let mining_time = start.elapsed().as_millis() as i64;
                self.say(format!("mining done, took {mining_time}"));
                store.add_result(dataset, run, keys::MINING_TIME, MetricValue::DurationMs(mining_time));
                Ok(Some(model))
            }
            Outcome::Completed(Err(err)) => {
                self.say(format!("ERROR - miner encountered an implementation error: {err}"));
                Ok(None)
            }
            Outcome::Failed(panic) => {
                self.say(format!("ERROR - miner encountered an implementation error: {panic}"));
                Ok(None)
            }
            Outcome::TimedOut => {
                self.say("ERROR - miner timed out");
                Ok(None)
            }
            Outcome::Interrupted => {
                self.say("ERROR - miner was interrupted");
                Err(Error::Aborted)
            }
        };

        store.add_if_missing(dataset, run, keys::MINING_TIME, Sentinel::Timeout.into());
        result
    }

    /// Soundness stage. Computed at most once per run; sound-by-construction
    /// miner families short-circuit without invoking the checker.
    pub fn soundness(
        &self,
        miner: &Arc<dyn Miner>,
        model: &ProcessModel,
        dataset: &DatasetName,
        run: &str,
        store: &mut ResultStore,
    ) -> Result<SoundnessStatus> {
        if miner.sound_by_construction() {
            self.say("miner is sound by construction");
            store.add_result(dataset, run, keys::SOUNDNESS, MetricValue::label("sound"));
            return Ok(SoundnessStatus::Sound);
        }

        self.say("starting soundness");
        let checker = Arc::clone(&self.collaborators.soundness);
        let job_model = model.clone();
        let start = Instant::now();
        let outcome = self
            .worker
            .run(self.config.metric_timeout, move |_| checker.is_sound(&job_model));
        let elapsed = start.elapsed().as_millis() as i64;

        match outcome {
            Outcome::Completed(Ok(true)) => {
                store.add_result_timed(dataset, run, keys::SOUNDNESS, MetricValue::label("sound"), elapsed);
                Ok(SoundnessStatus::Sound)
            }
            Outcome::Completed(Ok(false)) => {
                store.add_result_timed(dataset, run, keys::SOUNDNESS, MetricValue::label("unsound"), elapsed);
                Ok(SoundnessStatus::Unsound)
            }
            Outcome::TimedOut => {
                store.add_result_timed(
                    dataset,
                    run,
                    keys::SOUNDNESS,
                    MetricValue::label("unsound-TIMEOUT"),
                    self.config.metric_timeout.as_millis() as i64,
                );
                Ok(SoundnessStatus::Unsound)
            }
            Outcome::Completed(Err(err)) => {
                self.say(format!("ERROR - soundness check failed: {err}"));
                store.add_result(dataset, run, keys::SOUNDNESS, MetricValue::label("unsound-ERROR"));
                Ok(SoundnessStatus::Unsound)
            }
            Outcome::Failed(panic) => {
                self.say(format!("ERROR - soundness check failed: {panic}"));
                store.add_result(dataset, run, keys::SOUNDNESS, MetricValue::label("unsound-ERROR"));
                Ok(SoundnessStatus::Unsound)
            }
            Outcome::Interrupted => Err(Error::Aborted),
        }
    }

    /// Complexity stage. Prefers a native diagram from the miner, else
    /// converts the mined net. Every metric is an independent bounded
    /// submission so one slow metric cannot block the others.
    #[allow(clippy::too_many_arguments)]
    pub fn complexity(
        &self,
        miner: &Arc<dyn Miner>,
        settings: &MinerSettings,
        model: &ProcessModel,
        log: &EventLog,
        dataset: &DatasetName,
        run: &str,
        store: &mut ResultStore,
        include_struct: bool,
    ) -> Result<()> {
        let mut diagram: Option<Diagram> = None;
        if miner.supports_diagram() {
            diagram = self.mine_diagram(miner, settings, log, dataset, run, store)?;
        }

        let diagram = match diagram {
            Some(diagram) => diagram,
            None => {
                self.say("WARN - could not mine diagram, converting net");
                let start = Instant::now();
                match self.collaborators.converter.to_diagram(model) {
                    Ok(diagram) => {
                        self.say(format!("Conversion took {} ms", start.elapsed().as_millis()));
                        diagram
                    }
                    Err(err) => {
                        self.say(format!("ERROR - net conversion failed: {err}"));
                        for metric in keys::COMPLEXITY {
                            store.add_result(dataset, run, metric, Sentinel::Error.into());
                        }
                        if include_struct {
                            store.add_result(dataset, run, keys::STRUCTUREDNESS, Sentinel::Error.into());
                        }
                        return Ok(());
                    }
                }
            }
        };

        let calc = Arc::new(ComplexityCalculator::new(diagram));
        self.say("starting complexity");

        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_NODE, move || {
            Ok(MetricValue::Number(c.size()))
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_ARC, move || {
            Ok(MetricValue::Number(c.flow_size()))
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_CONNECTORS, move || {
            Ok(MetricValue::Number(c.connector_size()))
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_DENSITY_MIN, move || {
            c.min_connector_density().map(MetricValue::Number)
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_DENSITY_MAX, move || {
            c.max_connector_density().map(MetricValue::Number)
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_DENSITY_MEAN, move || {
            Ok(MetricValue::Number(c.mean_connector_density()))
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_DENSITY_MEDIAN, move || {
            c.median_connector_density().map(MetricValue::Number)
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_CNC, move || {
            Ok(MetricValue::Number(c.cnc()))
        })?;
        let c = Arc::clone(&calc);
        self.bounded_metric(store, dataset, run, keys::SIZE_CFC, move || {
            Ok(MetricValue::Number(c.cfc()))
        })?;

        if include_struct {
            if miner.sound_by_construction() {
                self.say("sound by construction -> shortcut structuredness");
                store.add_result_timed(dataset, run, keys::STRUCTUREDNESS, MetricValue::Number(1.0), 0);
            } else {
                let c = Arc::clone(&calc);
                self.bounded_metric(store, dataset, run, keys::STRUCTUREDNESS, move || {
                    Ok(MetricValue::Number(c.structuredness()))
                })?;
            }
        }

        self.say("done complexity");
        Ok(())
    }

    fn mine_diagram(
        &self,
        miner: &Arc<dyn Miner>,
        settings: &MinerSettings,
        log: &EventLog,
        dataset: &DatasetName,
        run: &str,
        store: &mut ResultStore,
    ) -> Result<Option<Diagram>> {
        let mining_log = log.clone();
        let job_miner = Arc::clone(miner);
        let job_settings = settings.clone();

        let start = Instant::now();
        let outcome = self.worker.run(self.config.miner_timeout, move |_| {
            job_miner.mine_diagram(&mining_log, &job_settings)
        });

        let result = match outcome {
            Outcome::Completed(Ok(diagram)) => {
                let mining_time = start.elapsed().as_millis() as i64;
                self.say(format!("diagram mining done, took {mining_time}"));
                store.add_result(
                    dataset,
                    run,
                    keys::MINING_TIME_DIAGRAM,
                    MetricValue::DurationMs(mining_time),
                );
                Ok(Some(diagram))
            }
            Outcome::Completed(Err(err)) => {
                self.say(format!("ERROR - diagram miner failed: {err}"));
                Ok(None)
            }
            Outcome::Failed(panic) => {
                self.say(format!("ERROR - diagram miner failed: {panic}"));
                Ok(None)
            }
            Outcome::TimedOut => {
                self.say("ERROR - diagram miner timed out");
                Ok(None)
            }
            Outcome::Interrupted => {
                self.say("ERROR - diagram miner was interrupted");
                Err(Error::Aborted)
            }
        };

        store.add_if_missing(dataset, run, keys::MINING_TIME, Sentinel::Timeout.into());
        result
    }

    fn bounded_metric<F>(
        &self,
        store: &mut ResultStore,
        dataset: &DatasetName,
        run: &str,
        metric: &str,
        job: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Result<MetricValue> + Send + 'static,
    {
        self.say(format!("computing {metric}"));
        let start = Instant::now();
        let outcome = self.worker.run(self.config.metric_timeout, move |_| job());
        let elapsed = start.elapsed().as_millis() as i64;

        let value = match outcome {
            Outcome::Completed(Ok(value)) => value,
            Outcome::Completed(Err(err)) => {
                self.say(format!("ERROR - computing {metric}: {err}"));
                Sentinel::Error.into()
            }
            Outcome::Failed(panic) => {
                self.say(format!("ERROR - computing {metric}: {panic}"));
                Sentinel::Error.into()
            }
            Outcome::TimedOut => {
                self.say(format!("timeout for metric {metric}"));
                Sentinel::Timeout.into()
            }
            Outcome::Interrupted => return Err(Error::Aborted),
        };

        store.add_result_timed(dataset, run, metric, value, elapsed);
        Ok(())
    }

    /// Performance stage, gated on soundness. Fitness and precision share
    /// one combined deadline of twice the metric timeout.
    pub fn performance(
        &self,
        model: &ProcessModel,
        log: &EventLog,
        soundness: SoundnessStatus,
        dataset: &DatasetName,
        run: &str,
        store: &mut ResultStore,
    ) -> Result<()> {
        if !soundness.is_sound() {
            self.say("ERROR - result is not sound, skipping performance");
            store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::NotSound.into());
            store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::NotSound.into());
            return Ok(());
        }

        store.add_result(
            dataset,
            run,
            keys::PERFORMANCE_TYPE,
            MetricValue::label("alignment-based"),
        );

        let combined = 2 * self.config.metric_timeout;
        let deadline = Instant::now() + combined;

        self.say("computing fitness");
        self.say(format!(
            "Metric timeout: {}",
            self.config.metric_timeout.as_millis()
        ));
        let fitness_eval = Arc::clone(&self.collaborators.fitness);
        let job_model = model.clone();
        let job_log = log.clone();
        let threads = self.config.fitness_threads;

        let start = Instant::now();
        let outcome = self.worker.run(combined, move |_| {
            fitness_eval.replay(&job_model, &job_log, threads)
        });
        let fitness_time = start.elapsed().as_millis() as i64;

        let replay = match outcome {
            Outcome::Completed(Ok(replay)) => replay,
            Outcome::Completed(Err(err)) => {
                self.say(format!("ERROR - exception in performance, returning: {err}"));
                store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::Error.into());
                store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::Error.into());
                self.settle();
                return Ok(());
            }
            Outcome::Failed(panic) => {
                self.say(format!("ERROR - exception in performance, returning: {panic}"));
                store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::Error.into());
                store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::Error.into());
                self.settle();
                return Ok(());
            }
            Outcome::TimedOut => {
                self.say("ERROR - fitness timeout, skipping others");
                store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::Timeout.into());
                store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::Timeout.into());
                self.settle();
                return Ok(());
            }
            Outcome::Interrupted => return Err(Error::Aborted),
        };

        let Some(replay) = replay else {
            for metric in [
                keys::FITNESS,
                keys::PRECISION,
                keys::CONFORMANCE_UNIQUE,
                keys::CONFORMANCE_TOTAL,
                keys::CONFORMANCE_UNIQUE_FRAC,
                keys::CONFORMANCE_TOTAL_FRAC,
            ] {
                store.add_result(dataset, run, metric, Sentinel::NullResult.into());
            }
            self.settle();
            return Ok(());
        };

        let replay_size = self.record_fitness(store, dataset, run, &replay, fitness_time);
        store.add_result(
            dataset,
            run,
            keys::DEBUG_LOG_SIZE,
            MetricValue::Number(log.len() as f64),
        );
        store.add_result(
            dataset,
            run,
            keys::DEBUG_REPLAY_SIZE,
            MetricValue::Number(replay_size as f64),
        );
        let replay_correct = if replay_size == log.len() as i64 {
            MetricValue::label("OK")
        } else {
            MetricValue::label("ERR-NOT_EQUAL")
        };
        store.add_result(dataset, run, keys::DEBUG_REPLAY_CORRECT, replay_correct);

        if replay_size < 0 {
            store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::Unreliable.into());
            self.settle();
            return Ok(());
        }

        self.say("computing precision");
        let precision_eval = Arc::clone(&self.collaborators.precision);
        let job_model = model.clone();
        let job_log = log.clone();
        let job_replay = Arc::new(replay);

        // bounded by what is left of the combined deadline
        let remaining = deadline.saturating_duration_since(Instant::now());
        let start = Instant::now();
        let outcome = self.worker.run(remaining, move |_| {
            precision_eval.precision(&job_log, &job_model, &job_replay)
        });
        let precision_time = start.elapsed().as_millis() as i64;

        match outcome {
            Outcome::Completed(Ok(precision)) => {
                store.add_result_timed(
                    dataset,
                    run,
                    keys::PRECISION,
                    MetricValue::Number(precision),
                    precision_time,
                );
            }
            Outcome::Completed(Err(err)) => {
                self.say(format!("ERROR - exception in performance, returning: {err}"));
                store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::Error.into());
                store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::Error.into());
                self.settle();
                return Ok(());
            }
            Outcome::Failed(panic) => {
                self.say(format!("ERROR - exception in performance, returning: {panic}"));
                store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::Error.into());
                store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::Error.into());
                self.settle();
                return Ok(());
            }
            Outcome::TimedOut => {
                self.say("ERROR - precision timeout");
                store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::Timeout.into());
                store.add_if_missing(dataset, run, keys::PRECISION, Sentinel::Timeout.into());
                self.settle();
                return Ok(());
            }
            Outcome::Interrupted => return Err(Error::Aborted),
        }

        self.settle();

        // f-score from the stored values, degenerate combinations excluded
        let fitness = store.get(dataset, run, keys::FITNESS).as_f64();
        let precision = store.get(dataset, run, keys::PRECISION).as_f64();
        if let (Some(fitness), Some(precision)) = (fitness, precision) {
            if fitness < 0.001 && precision < 0.001 {
                store.add_result(dataset, run, keys::F_SCORE, Sentinel::ErrorValue.into());
            } else {
                let f_score = 2.0 * fitness * precision / (fitness + precision);
                store.add_result(dataset, run, keys::F_SCORE, MetricValue::Number(f_score));
            }
        }
        Ok(())
    }

    /// Store the fitness block of a replay. Returns the number of reliably
    /// replayed traces, or -1 when too many variants were unreliable.
    fn record_fitness(
        &self,
        store: &mut ResultStore,
        dataset: &DatasetName,
        run: &str,
        replay: &ReplayResult,
        fitness_time: i64,
    ) -> i64 {
        let mut unique_perfect = 0usize;
        let mut total_perfect = 0usize;
        let mut unique_reliable = 0usize;
        let mut reliable_traces = 0usize;
        let mut total_count = 0usize;
        let mut unreliable_variants = 0usize;

        for variant in &replay.variants {
            total_count += variant.traces;
            if !variant.reliable {
                unreliable_variants += 1;
                continue;
            }
            unique_reliable += 1;
            reliable_traces += variant.traces;
            if variant.is_perfect() {
                unique_perfect += 1;
                total_perfect += variant.traces;
            }
        }

        self.say(format!("Number unreliable: {unreliable_variants}"));
        if unreliable_variants > replay.unique_size() / 2 {
            store.add_if_missing(dataset, run, keys::FITNESS, Sentinel::Unreliable.into());
            for metric in [
                keys::CONFORMANCE_UNIQUE,
                keys::CONFORMANCE_TOTAL,
                keys::CONFORMANCE_UNIQUE_FRAC,
                keys::CONFORMANCE_TOTAL_FRAC,
            ] {
                store.add_if_missing(dataset, run, metric, Sentinel::Unreliable.into());
            }
            return -1;
        }

        store.add_result_timed(
            dataset,
            run,
            keys::FITNESS,
            MetricValue::Number(replay.trace_fitness()),
            fitness_time,
        );
        store.add_result(
            dataset,
            run,
            keys::PERFORMANCE_UNIQUE_SIZE,
            MetricValue::Number(replay.unique_size() as f64),
        );
        store.add_result(
            dataset,
            run,
            keys::PERFORMANCE_TOTAL_SIZE,
            MetricValue::Number(total_count as f64),
        );
        store.add_result(
            dataset,
            run,
            keys::CONFORMANCE_UNIQUE,
            MetricValue::Number(unique_perfect as f64),
        );
        store.add_result(
            dataset,
            run,
            keys::CONFORMANCE_TOTAL,
            MetricValue::Number(total_perfect as f64),
        );
        store.add_result(
            dataset,
            run,
            keys::CONFORMANCE_UNIQUE_FRAC,
            MetricValue::Number(unique_perfect as f64 / unique_reliable as f64),
        );
        store.add_result(
            dataset,
            run,
            keys::CONFORMANCE_TOTAL_FRAC,
            MetricValue::Number(total_perfect as f64 / reliable_traces as f64),
        );

        reliable_traces as i64
    }
}
