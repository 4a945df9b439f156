//! # Housing
//!
//! Training pipeline and prediction service for a median housing value
//! regression model.
//!
//! The crate is organised around a fixed-order training pipeline:
//!
//! - **Configuration resolution**: a YAML document is loaded once per run and
//!   resolved into per-stage path bundles rooted under a timestamped artifact
//!   directory
//! - **Typed stage chain**: ingestion, validation, transformation, training,
//!   evaluation and deployment, each consuming the artifact of the stage
//!   before it
//! - **Experiment tracking**: an atomically guarded status record that allows
//!   at most one retraining run at a time
//! - **Prediction**: loading the newest deployed model and scoring one row
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use housing::prelude::*;
//!
//! let tracker = Arc::new(ExperimentTracker::new());
//! let factory = Arc::new(HousingPipelineFactory::new(root_dir, config_path));
//! let pipeline = Arc::new(Pipeline::new(factory, tracker));
//!
//! // Returns as soon as the worker thread has been spawned.
//! let handle = pipeline.start()?;
//! assert!(pipeline.is_running());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod data;
pub mod errors;
pub mod events;
pub mod ml;
pub mod observability;
pub mod pipeline;
pub mod predictor;
pub mod stages;
pub mod testing;
pub mod utils;

#[cfg(feature = "server")]
pub mod web;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        AppSettings, ConfigDocument, Configuration, DataIngestionConfig,
        DataTransformationConfig, DataValidationConfig, ModelEvaluationConfig,
        ModelPusherConfig, ModelTrainerConfig, TrainingPipelineConfig,
    };
    pub use crate::core::{
        DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact,
        Experiment, ModelEvaluationArtifact, ModelPusherArtifact, ModelTrainerArtifact,
        RunOutcome, RunState, StageName,
    };
    pub use crate::errors::{
        ConfigError, DataError, HousingError, PredictionError, StageError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{
        ExperimentTracker, HousingPipelineFactory, Pipeline, PipelineFactory, RunSummary,
    };
    pub use crate::predictor::{HousingData, HousingPredictor};
    pub use crate::stages::{Stage, StageChain, StageRecord, StageRunner, StageSequence};
    pub use crate::utils::current_time_stamp;
    pub use std::sync::Arc;
}
