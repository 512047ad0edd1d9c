//! The staged evaluation pipeline: mine, check soundness, compute
//! structural complexity, compute alignment-based performance, and reduce
//! across cross-validation folds.

pub mod crossval;
pub mod stages;

pub use crossval::{average, masked_average, total, CrossValidationAggregator};
pub use stages::{keys, StageRunner};

use crate::diagnostics::{default_sink, SharedSink};
use crate::metrics::{
    EscapingEdges, FitnessEvaluator, PrecisionEvaluator, SoundnessChecker, StateSpaceChecker,
    TokenReplay,
};
use crate::model::{DiagramConverter, StructuralConverter};
use std::sync::Arc;
use std::time::Duration;

/// Deadlines and knobs for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Deadline for one mining submission
    pub miner_timeout: Duration,
    /// Deadline for one metric submission; the performance stage shares a
    /// combined `2 x metric_timeout` deadline across its two sub-steps
    pub metric_timeout: Duration,
    /// Thread-count hint forwarded to the fitness collaborator
    pub fitness_threads: usize,
    /// Pause after the performance stage so a cancelled collaborator can
    /// wind down before the worker is reused
    pub settle_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        const HOUR: Duration = Duration::from_secs(60 * 60);
        Self {
            miner_timeout: HOUR,
            metric_timeout: HOUR,
            fitness_threads: 1,
            settle_delay: Duration::from_millis(5000),
        }
    }
}

/// The measurement collaborators one pipeline instance consumes.
#[derive(Clone)]
pub struct Collaborators {
    pub soundness: Arc<dyn SoundnessChecker>,
    pub converter: Arc<dyn DiagramConverter>,
    pub fitness: Arc<dyn FitnessEvaluator>,
    pub precision: Arc<dyn PrecisionEvaluator>,
    pub sink: SharedSink,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            soundness: Arc::new(StateSpaceChecker::new()),
            converter: Arc::new(StructuralConverter::new()),
            fitness: Arc::new(TokenReplay::new()),
            precision: Arc::new(EscapingEdges::new()),
            sink: default_sink(),
        }
    }
}

impl Collaborators {
    pub fn with_sink(sink: SharedSink) -> Self {
        Self {
            sink,
            ..Self::default()
        }
    }
}
