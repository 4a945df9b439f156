//! Resolved per-stage configuration bundles.
//!
//! Every bundle holds fully resolved absolute paths and scalar parameters. They
//! are produced once per run by [`super::Configuration`] and never mutated.

use super::constants::{EXPERIMENT_DIR_NAME, EXPERIMENT_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root of one pipeline's artifact tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPipelineConfig {
    /// `<root>/<pipeline_name>/<artifact_dir>`.
    pub artifact_dir: PathBuf,
}

impl TrainingPipelineConfig {
    /// Path of the CSV file that accumulates finished experiments.
    #[must_use]
    pub fn experiment_file_path(&self) -> PathBuf {
        self.artifact_dir
            .join(EXPERIMENT_DIR_NAME)
            .join(EXPERIMENT_FILE_NAME)
    }
}

/// Where ingestion downloads, unpacks and splits the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIngestionConfig {
    pub dataset_download_url: String,
    pub tgz_download_dir: PathBuf,
    pub raw_data_dir: PathBuf,
    pub ingested_train_dir: PathBuf,
    pub ingested_test_dir: PathBuf,
}

/// Schema location and report destinations for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataValidationConfig {
    pub schema_file_path: PathBuf,
    pub report_file_path: PathBuf,
    pub report_page_file_path: PathBuf,
}

/// Feature engineering switch and output locations for transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransformationConfig {
    pub add_bedroom_per_room: bool,
    pub transformed_train_dir: PathBuf,
    pub transformed_test_dir: PathBuf,
    pub preprocessed_object_file_path: PathBuf,
}

/// Model output path, accuracy floor and candidate list for training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTrainerConfig {
    pub trained_model_file_path: PathBuf,
    pub base_accuracy: f64,
    pub model_config_file_path: PathBuf,
}

/// Location of the evaluation record comparing trained and deployed models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEvaluationConfig {
    pub model_evaluation_file_path: PathBuf,
    /// Timestamp of the run, used as the history key.
    pub time_stamp: String,
}

/// Destination directory for an accepted model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPusherConfig {
    /// `<root>/<model_export_dir>/<timestamp>`.
    pub export_dir_path: PathBuf,
}
