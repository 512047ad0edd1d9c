//! Measurement collaborators.
//!
//! The pipeline consumes these interfaces; the implementations in this
//! module are the built-in ones. Everything here runs inside the bounded
//! worker, so implementations bound their own search budgets instead of
//! relying on external interruption.

pub mod complexity;
pub mod precision;
pub mod replay;
pub mod soundness;

pub use complexity::ComplexityCalculator;
pub use precision::EscapingEdges;
pub use replay::{ReplayResult, TokenReplay, VariantReplay};
pub use soundness::StateSpaceChecker;

use crate::core::errors::Result;
use crate::event_log::EventLog;
use crate::model::ProcessModel;

/// Decides whether a model can always complete without deadlock or
/// left-over tokens.
pub trait SoundnessChecker: Send + Sync {
    fn is_sound(&self, model: &ProcessModel) -> Result<bool>;
}

/// Computes a replay of the log over the model. `None` means the
/// collaborator produced no usable replay without erroring.
pub trait FitnessEvaluator: Send + Sync {
    fn replay(
        &self,
        model: &ProcessModel,
        log: &EventLog,
        threads: usize,
    ) -> Result<Option<ReplayResult>>;
}

/// Computes precision from a replay result.
pub trait PrecisionEvaluator: Send + Sync {
    fn precision(
        &self,
        log: &EventLog,
        model: &ProcessModel,
        replay: &ReplayResult,
    ) -> Result<f64>;
}
