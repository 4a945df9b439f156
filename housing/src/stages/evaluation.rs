//! Compares the freshly trained model with the best model recorded so far.
//!
//! This stage only reads the evaluation record. The pusher promotes an
//! accepted model into it after the model has been deployed.

use super::Stage;
use crate::config::ModelEvaluationConfig;
use crate::core::{ModelEvaluationArtifact, ModelTrainerArtifact, StageName};
use crate::errors::HousingResult;
use crate::utils::{read_yaml_file, write_yaml_file};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// A model entry in the evaluation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedModel {
    pub model_path: PathBuf,
    pub model_accuracy: f64,
    /// Run that produced the model.
    pub time_stamp: String,
}

/// The evaluation document kept across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Best accepted model so far.
    #[serde(default)]
    pub best_model: Option<EvaluatedModel>,
    /// Models that were once best, keyed by the run that replaced them.
    #[serde(default)]
    pub history: BTreeMap<String, EvaluatedModel>,
}

impl EvaluationRecord {
    /// Reads the record, returning an empty one when the file does not exist.
    pub fn load(path: &Path) -> HousingResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(read_yaml_file(path)?)
    }

    /// Returns true if a model with `accuracy` beats the recorded best.
    #[must_use]
    pub fn accepts(&self, accuracy: f64) -> bool {
        self.best_model
            .as_ref()
            .map_or(true, |best| accuracy > best.model_accuracy)
    }

    /// Makes `model` the best model, moving the previous one into history.
    pub fn promote(&mut self, model: EvaluatedModel, time_stamp: &str) {
        if let Some(previous) = self.best_model.replace(model) {
            self.history.insert(time_stamp.to_string(), previous);
        }
    }

    /// Writes the record as YAML.
    pub fn save(&self, path: &Path) -> HousingResult<()> {
        write_yaml_file(path, self)
    }
}

/// Accepts or rejects the trained model.
#[derive(Debug)]
pub struct ModelEvaluation {
    config: ModelEvaluationConfig,
}

impl ModelEvaluation {
    /// Creates the stage.
    #[must_use]
    pub fn new(config: ModelEvaluationConfig) -> Self {
        Self { config }
    }
}

impl Stage for ModelEvaluation {
    type Input = ModelTrainerArtifact;
    type Output = ModelEvaluationArtifact;

    fn name(&self) -> &str {
        StageName::ModelEvaluation.as_str()
    }

    fn run(&self, input: ModelTrainerArtifact) -> HousingResult<ModelEvaluationArtifact> {
        let path = &self.config.model_evaluation_file_path;
        let record = EvaluationRecord::load(path)?;
        let previous = record.best_model.as_ref().map(|best| best.model_accuracy);

        if !record.accepts(input.model_accuracy) {
            info!(
                accuracy = input.model_accuracy,
                best_accuracy = previous,
                "Trained model rejected"
            );
            return Ok(ModelEvaluationArtifact {
                is_model_accepted: false,
                evaluated_model_path: input.trained_model_file_path,
                model_accuracy: input.model_accuracy,
                model_evaluation_file_path: path.clone(),
                time_stamp: self.config.time_stamp.clone(),
                message: format!(
                    "Trained model accuracy {:.4} does not beat deployed accuracy {:.4}",
                    input.model_accuracy,
                    previous.unwrap_or_default()
                ),
            });
        }

        info!(accuracy = input.model_accuracy, best_accuracy = previous, "Trained model accepted");
        Ok(ModelEvaluationArtifact {
            is_model_accepted: true,
            evaluated_model_path: input.trained_model_file_path,
            model_accuracy: input.model_accuracy,
            model_evaluation_file_path: path.clone(),
            time_stamp: self.config.time_stamp.clone(),
            message: match previous {
                Some(best) => format!(
                    "Trained model accuracy {:.4} beats deployed accuracy {best:.4}",
                    input.model_accuracy
                ),
                None => "No deployed model yet; trained model accepted".to_string(),
            },
        })
    }
}
