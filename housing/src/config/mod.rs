//! Pipeline configuration.
//!
//! The pipeline document is a YAML mapping with one section per stage. It is
//! loaded once per run into a [`ConfigDocument`] and resolved by
//! [`Configuration`] into per-stage bundles rooted under a timestamped
//! artifact directory. Process settings live in [`AppSettings`].

pub mod constants;
mod document;
mod entity;
mod resolver;
mod settings;

pub use document::{ConfigDocument, Section};
pub use entity::{
    DataIngestionConfig, DataTransformationConfig, DataValidationConfig, ModelEvaluationConfig,
    ModelPusherConfig, ModelTrainerConfig, TrainingPipelineConfig,
};
pub use resolver::Configuration;
pub use settings::{AppSettings, LogFormat};
