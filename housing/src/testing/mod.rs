//! Testing utilities for the housing pipeline.
//!
//! This module provides:
//! - Fixture documents (configuration, schema, model catalog) and a project
//!   tree writer
//! - Deterministic synthetic datasets
//! - Mock stages and a mock pipeline factory

pub mod fixtures;
mod mocks;

pub use fixtures::{
    config_document_yaml, model_yaml, ocean_proximity_domain, sample_record, schema_yaml,
    synthetic_records, write_dataset_tgz, write_housing_csv, write_project,
};
pub use mocks::{FailingStage, Gate, MockPipelineFactory, RecordingStage};
