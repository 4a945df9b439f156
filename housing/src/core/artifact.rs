//! Per-stage artifact records.
//!
//! Each stage returns one of these and the next stage receives it as its only
//! input besides its own configuration. Only the files they point at outlive
//! a run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output of the ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIngestionArtifact {
    /// Stratified training split.
    pub train_file_path: PathBuf,
    /// Stratified test split.
    pub test_file_path: PathBuf,
    pub is_ingested: bool,
    pub message: String,
}

/// Output of the validation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataValidationArtifact {
    pub schema_file_path: PathBuf,
    /// Drift report as JSON.
    pub report_file_path: PathBuf,
    /// Drift report as an HTML page.
    pub report_page_file_path: PathBuf,
    pub is_validated: bool,
    pub message: String,
    /// Train split the validation ran against.
    pub train_file_path: PathBuf,
    /// Test split the validation ran against.
    pub test_file_path: PathBuf,
}

/// Output of the transformation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransformationArtifact {
    pub is_transformed: bool,
    pub message: String,
    /// Scaled and encoded training matrix with the target as last column.
    pub transformed_train_file_path: PathBuf,
    pub transformed_test_file_path: PathBuf,
    /// Fitted preprocessor as JSON.
    pub preprocessed_object_file_path: PathBuf,
}

/// Output of the training stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTrainerArtifact {
    pub is_trained: bool,
    pub message: String,
    /// Serialized estimator (preprocessor plus model).
    pub trained_model_file_path: PathBuf,
    pub train_rmse: f64,
    pub test_rmse: f64,
    /// R² on the training matrix.
    pub train_accuracy: f64,
    /// R² on the test matrix.
    pub test_accuracy: f64,
    /// Harmonic mean of train and test accuracy.
    pub model_accuracy: f64,
}

/// Output of the evaluation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluationArtifact {
    pub is_model_accepted: bool,
    pub evaluated_model_path: PathBuf,
    pub model_accuracy: f64,
    /// Evaluation record to update once an accepted model is deployed.
    pub model_evaluation_file_path: PathBuf,
    /// Run that produced the evaluated model.
    pub time_stamp: String,
    pub message: String,
}

/// Output of the deployment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPusherArtifact {
    pub is_model_pushed: bool,
    /// Deployed model file, when pushed.
    pub export_model_file_path: Option<PathBuf>,
    /// Hex SHA-256 of the deployed file, when pushed.
    pub checksum: Option<String>,
    /// Accuracy of the evaluated model, pushed or not.
    pub model_accuracy: f64,
    pub message: String,
}
