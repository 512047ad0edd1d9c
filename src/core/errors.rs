//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for minebench operations
#[derive(Debug, Error)]
pub enum Error {
    /// The pipeline's own execution was asked to stop. This is the only
    /// error a stage propagates; everything else is recorded in the result
    /// store as a sentinel value.
    #[error("execution aborted: worker interrupted")]
    Aborted,

    /// A collaborator (miner, metric algorithm, converter) failed
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Event log import errors
    #[error("log import error in {path}: {message}")]
    LogImport { path: PathBuf, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a collaborator error from any displayable cause
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator(message.into())
    }

    /// Create a log import error with path context
    pub fn log_import(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::LogImport {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True when the error must abort the remaining stage sequence
    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Aborted)
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
