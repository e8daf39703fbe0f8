// src/progress.rs
use crate::error::Stage;

/// Lightweight progress reporting for one pipeline run.
/// Frontends implement this to surface status; tests use it to watch the state machine.
pub trait Progress {
    /// A stage completed.
    fn stage(&mut self, _stage: Stage) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// The session expired mid-fetch and we are logging in again.
    fn retry(&mut self, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self, _ok: bool) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Prints stage transitions to stderr (`-v`).
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn stage(&mut self, stage: Stage) {
        eprintln!("  -> {stage}");
    }
    fn log(&mut self, msg: &str) {
        eprintln!("     {msg}");
    }
    fn retry(&mut self, reason: &str) {
        eprintln!("  !! {reason}; logging in again");
    }
}
