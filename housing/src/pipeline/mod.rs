//! Pipeline assembly, run tracking and execution.
//!
//! This module provides:
//! - The factory that resolves configuration and assembles the typed stage
//!   chain for one run
//! - The experiment tracker that admits at most one run at a time
//! - The orchestrator that runs the chain on a worker thread

mod factory;
mod orchestrator;
mod tracker;

pub use factory::{HousingPipelineFactory, PipelineFactory, TrainingPipeline};
pub use orchestrator::{Pipeline, RunSummary, RETRAIN_THREAD_NAME};
pub use tracker::{ExperimentTracker, RunGuard};
