//! Progress reporting during a sync
//!
//! A side channel for user-facing status messages; not part of the
//! synchronization correctness contract.

/// Receives human-readable progress messages as a sync advances
pub trait ProgressSink: Send + Sync {
    fn progress(&self, message: &str);
}

/// Sink that discards all progress messages
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&self, _message: &str) {}
}
