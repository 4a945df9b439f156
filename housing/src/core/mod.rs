//! Core domain model types for the housing pipeline.
//!
//! This module contains the records passed between stages and the run status
//! types shared by the orchestrator and the web layer:
//! - Stage names, run states and run outcomes
//! - One artifact type per pipeline stage
//! - The experiment status record

mod artifact;
mod experiment;
mod status;

pub use artifact::{
    DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact,
    ModelEvaluationArtifact, ModelPusherArtifact, ModelTrainerArtifact,
};
pub use experiment::Experiment;
pub use status::{RunOutcome, RunState, StageName, StageStatus};
