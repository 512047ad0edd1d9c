//! Injectable diagnostic sink.
//!
//! The store and the pipeline narrate what they do through a sink handed in
//! at construction time instead of printing through process-wide state. The
//! default sink forwards to the `log` facade; tests capture lines in memory.

use parking_lot::Mutex;
use std::sync::Arc;

/// Receives one diagnostic line per store mutation or stage transition.
pub trait DiagnosticSink: Send + Sync {
    fn message(&self, line: &str);
}

/// Shared sink handle passed into each component.
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Forwards diagnostics to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn message(&self, line: &str) {
        log::info!("{line}");
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn message(&self, _line: &str) {}
}

/// Captures lines for inspection in tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn message(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Default sink used when a component is built without an explicit one.
pub fn default_sink() -> SharedSink {
    Arc::new(LogSink)
}
