// Export modules for library usage
pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod event_log;
pub mod metrics;
pub mod miners;
pub mod model;
pub mod pipeline;
pub mod runner;
pub mod store;
pub mod worker;

// Re-export commonly used types
pub use crate::core::{
    parse_duration, DatasetName, Error, MetricValue, MinerSettings, ParameterRange, Result,
    Sentinel, SoundnessStatus,
};

pub use crate::diagnostics::{DiagnosticSink, LogSink, MemorySink, NoopSink, SharedSink};

pub use crate::event_log::{EventLog, Fold, LogSplitter, ShuffleSplitter, Trace};

pub use crate::model::{Diagram, DiagramConverter, ProcessModel, StructuralConverter};

pub use crate::miners::{available_miners, resolve_miners, FlowerMiner, Miner, PrefixTreeMiner};

pub use crate::metrics::{
    ComplexityCalculator, EscapingEdges, FitnessEvaluator, PrecisionEvaluator, ReplayResult,
    SoundnessChecker, StateSpaceChecker, TokenReplay,
};

pub use crate::pipeline::{
    keys, Collaborators, CrossValidationAggregator, PipelineConfig, StageRunner,
};

pub use crate::store::{ResultStore, ResultsTree};

pub use crate::worker::{BoundedWorker, CancelToken, Outcome};
