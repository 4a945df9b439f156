//! Event sinks for pipeline observability.
//!
//! The stage runner emits `pipeline.*` and `stage.*` events with JSON
//! payloads. Sinks decide what to do with them: log, discard or collect.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event emitted when a run begins.
pub const PIPELINE_STARTED: &str = "pipeline.started";
/// Event emitted when every stage completed.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
/// Event emitted when a run aborted.
pub const PIPELINE_FAILED: &str = "pipeline.failed";
/// Event emitted before a stage runs.
pub const STAGE_STARTED: &str = "stage.started";
/// Event emitted after a stage produced its artifact.
pub const STAGE_COMPLETED: &str = "stage.completed";
/// Event emitted when a stage raised an error.
pub const STAGE_FAILED: &str = "stage.failed";
