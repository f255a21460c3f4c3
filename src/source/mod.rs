//! Telemetry sources.

mod replay;

use crate::Result;
use crate::snapshot::Snapshot;

pub use replay::{RecordedTick, ReplaySource};

/// What a source produced for one poll.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A validated snapshot; the source is connected
    Snapshot(Snapshot),
    /// The simulator went away
    Disconnected,
    /// No more data will ever come (end of a recording)
    Ended,
}

/// Trait for telemetry sources
///
/// A source is polled once per tick by the sync loop, which owns the pacing.
/// Returning an error does not end the loop: the next poll is attempted
/// after a backoff, up to a bounded number of consecutive failures.
#[async_trait::async_trait]
pub trait TelemetrySource: Send + 'static {
    /// Produce the next event.
    async fn next_event(&mut self) -> Result<SourceEvent>;
}
