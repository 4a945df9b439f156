//! Stage names and run state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed stages of the training pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Download, unpack and split the dataset.
    DataIngestion,
    /// Check the split against the dataset schema.
    DataValidation,
    /// Fit the preprocessor and write feature matrices.
    DataTransformation,
    /// Fit and select a regression model.
    ModelTrainer,
    /// Compare the trained model with the best recorded one.
    ModelEvaluation,
    /// Deploy an accepted model.
    ModelPusher,
}

impl StageName {
    /// All stages in execution order.
    pub const ALL: [Self; 6] = [
        Self::DataIngestion,
        Self::DataValidation,
        Self::DataTransformation,
        Self::ModelTrainer,
        Self::ModelEvaluation,
        Self::ModelPusher,
    ];

    /// Returns the snake_case name used in logs, events and errors.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataIngestion => "data_ingestion",
            Self::DataValidation => "data_validation",
            Self::DataTransformation => "data_transformation",
            Self::ModelTrainer => "model_trainer",
            Self::ModelEvaluation => "model_evaluation",
            Self::ModelPusher => "model_pusher",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The execution status of one stage within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage is executing.
    Running,
    /// Stage produced its artifact.
    Completed,
    /// Stage raised an error; the run was aborted.
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Whether a retraining run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run is active.
    #[default]
    Idle,
    /// A run is active.
    Running,
}

impl RunState {
    /// Returns true for [`RunState::Running`].
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every stage completed.
    Succeeded,
    /// A stage or the configuration failed.
    Failed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
