//! Single-worker execution context with per-submission deadlines.
//!
//! All heavy collaborator computation in one pipeline instance runs behind
//! one background thread, one unit of work at a time. The caller blocks on
//! each submission until the work completes or its deadline elapses.
//!
//! Cancellation is cooperative and best-effort: on a timeout the worker
//! flips the job's cancel token and returns control to the caller, but a
//! collaborator that never checks the token keeps the worker thread busy
//! until it finishes on its own. Its late result is discarded, and any
//! queued submission waits behind it. This mirrors the contract of the
//! executor the pipeline is built around and is an accepted trade-off, not
//! something callers should try to work around.

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Cooperative cancellation flag handed to every submitted job.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of one bounded submission.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The job finished within its deadline
    Completed(T),
    /// The deadline elapsed; cancellation was requested but the job may
    /// still be running on the worker thread
    TimedOut,
    /// The job panicked
    Failed(String),
    /// The worker is shut down or its thread is gone; the caller must abort
    /// its remaining sequence
    Interrupted,
}

impl<T> Outcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A single background worker bounded by per-submission deadlines.
///
/// The worker shuts down when dropped; a well-behaved idle worker exits
/// immediately, one stuck in an uncooperative job exits after that job
/// finally returns.
pub struct BoundedWorker {
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl BoundedWorker {
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded::<Job>();
        let handle = std::thread::Builder::new()
            .name("minebench-worker".into())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            })
            .expect("failed to spawn worker thread");
        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    /// Run one unit of work, blocking until it completes or `timeout`
    /// elapses, whichever comes first. The deadline includes any time the
    /// job spends queued behind earlier work.
    pub fn run<T, F>(&self, timeout: Duration, job: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelToken) -> T + Send + 'static,
    {
        let token = CancelToken::new();
        let job_token = token.clone();
        let (result_tx, result_rx) = channel::bounded(1);

        let wrapped: Job = Box::new(move || {
            let result = catch_unwind(AssertUnwindSafe(|| job(&job_token)));
            // the receiver is gone when the submission already timed out;
            // the late result is discarded
            let _ = result_tx.send(result);
        });

        let Some(sender) = &self.sender else {
            return Outcome::Interrupted;
        };
        if sender.send(wrapped).is_err() {
            return Outcome::Interrupted;
        }

        match result_rx.recv_timeout(timeout) {
            Ok(Ok(value)) => Outcome::Completed(value),
            Ok(Err(panic)) => Outcome::Failed(panic_message(&*panic)),
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                Outcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => Outcome::Interrupted,
        }
    }

    /// Stop accepting work. Does not wait for an in-flight job; the thread
    /// exits once the current job returns and sees the closed channel.
    pub fn shutdown(&mut self) {
        self.sender.take();
        self.handle.take();
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender.is_none()
    }
}

impl Default for BoundedWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BoundedWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker job panicked".to_string()
    }
}
