//! Stub miners and collaborators shared by the pipeline tests.
#![allow(dead_code)]

use minebench::metrics::replay::VariantReplay;
use minebench::{
    Collaborators, EventLog, FitnessEvaluator, MemorySink, Miner, MinerSettings, PipelineConfig,
    PrecisionEvaluator, ProcessModel, ReplayResult, SoundnessChecker,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tight deadlines and no settle pause, so tests stay fast.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        miner_timeout: Duration::from_millis(5000),
        metric_timeout: Duration::from_millis(5000),
        fitness_threads: 1,
        settle_delay: Duration::ZERO,
    }
}

pub fn tiny_log() -> EventLog {
    EventLog::new(
        "tiny",
        vec![
            vec!["a".into(), "b".into()],
            vec!["a".into(), "b".into()],
            vec!["a".into(), "c".into()],
            vec!["a".into(), "b".into()],
        ],
    )
}

/// Minimal sound sequence net.
pub fn sequence_model() -> ProcessModel {
    let mut net = ProcessModel::new("stub");
    let start = net.add_place("start");
    let mid = net.add_place("mid");
    let end = net.add_place("end");
    let a = net.add_transition("a");
    let b = net.add_transition("b");
    net.add_arc(start, a);
    net.add_arc(a, mid);
    net.add_arc(mid, b);
    net.add_arc(b, end);
    net.mark(start, end);
    net
}

/// Miner that sleeps before producing a sequence net.
pub struct SleepyMiner {
    pub delay: Duration,
}

impl Miner for SleepyMiner {
    fn name(&self) -> &str {
        "SleepyMiner"
    }

    fn acronym(&self) -> &str {
        "SLEEPY"
    }

    fn mine(&self, _log: &EventLog, _settings: &MinerSettings) -> minebench::Result<ProcessModel> {
        std::thread::sleep(self.delay);
        Ok(sequence_model())
    }
}

/// Soundness checker with a fixed verdict and a call counter.
pub struct FixedSoundness {
    pub sound: bool,
    pub calls: Arc<AtomicUsize>,
}

impl FixedSoundness {
    pub fn new(sound: bool) -> Self {
        Self {
            sound,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SoundnessChecker for FixedSoundness {
    fn is_sound(&self, _model: &ProcessModel) -> minebench::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sound)
    }
}

/// Fitness collaborator returning one reliable variant with a fixed
/// fitness, and counting invocations.
pub struct FixedFitness {
    pub fitness: f64,
    pub calls: Arc<AtomicUsize>,
}

impl FixedFitness {
    pub fn new(fitness: f64) -> Self {
        Self {
            fitness,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FitnessEvaluator for FixedFitness {
    fn replay(
        &self,
        _model: &ProcessModel,
        log: &EventLog,
        _threads: usize,
    ) -> minebench::Result<Option<ReplayResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(ReplayResult {
            variants: vec![VariantReplay {
                traces: log.len(),
                fitness: self.fitness,
                reliable: true,
                steps: Vec::new(),
            }],
        }))
    }
}

/// Precision collaborator returning a fixed value.
pub struct FixedPrecision {
    pub precision: f64,
}

impl PrecisionEvaluator for FixedPrecision {
    fn precision(
        &self,
        _log: &EventLog,
        _model: &ProcessModel,
        _replay: &ReplayResult,
    ) -> minebench::Result<f64> {
        Ok(self.precision)
    }
}

/// Collaborator set with fixed fitness/precision values, a fixed soundness
/// verdict, and a memory sink. Returns the set plus the counters.
pub fn fixed_collaborators(
    sound: bool,
    fitness: f64,
    precision: f64,
) -> (Collaborators, Arc<AtomicUsize>, Arc<AtomicUsize>, MemorySink) {
    let soundness = FixedSoundness::new(sound);
    let fitness_eval = FixedFitness::new(fitness);
    let soundness_calls = Arc::clone(&soundness.calls);
    let fitness_calls = Arc::clone(&fitness_eval.calls);
    let sink = MemorySink::new();

    let collaborators = Collaborators {
        soundness: Arc::new(soundness),
        fitness: Arc::new(fitness_eval),
        precision: Arc::new(FixedPrecision { precision }),
        sink: Arc::new(sink.clone()),
        ..Collaborators::default()
    };
    (collaborators, soundness_calls, fitness_calls, sink)
}
