//! Deploys an accepted model into the saved models directory.
//!
//! The evaluation record is updated only after the copy succeeds.

use super::evaluation::{EvaluatedModel, EvaluationRecord};
use super::Stage;
use crate::config::ModelPusherConfig;
use crate::core::{ModelEvaluationArtifact, ModelPusherArtifact, StageName};
use crate::errors::{HousingError, HousingResult};
use crate::utils::file_sha256;
use std::fs;
use tracing::info;

/// Copies the accepted model to `<saved_models>/<timestamp>/`.
#[derive(Debug)]
pub struct ModelPusher {
    config: ModelPusherConfig,
}

impl ModelPusher {
    /// Creates the stage.
    #[must_use]
    pub fn new(config: ModelPusherConfig) -> Self {
        Self { config }
    }
}

impl Stage for ModelPusher {
    type Input = ModelEvaluationArtifact;
    type Output = ModelPusherArtifact;

    fn name(&self) -> &str {
        StageName::ModelPusher.as_str()
    }

    fn run(&self, input: ModelEvaluationArtifact) -> HousingResult<ModelPusherArtifact> {
        if !input.is_model_accepted {
            info!(model = %input.evaluated_model_path.display(), "Model not accepted, skipping push");
            return Ok(ModelPusherArtifact {
                is_model_pushed: false,
                export_model_file_path: None,
                checksum: None,
                model_accuracy: input.model_accuracy,
                message: "Model was not accepted; nothing deployed".to_string(),
            });
        }

        let file_name = input.evaluated_model_path.file_name().ok_or_else(|| {
            HousingError::Internal(format!(
                "Evaluated model path '{}' has no file name",
                input.evaluated_model_path.display()
            ))
        })?;
        fs::create_dir_all(&self.config.export_dir_path)?;
        let export_path = self.config.export_dir_path.join(file_name);
        fs::copy(&input.evaluated_model_path, &export_path)?;
        let checksum = file_sha256(&export_path)?;

        let mut record = EvaluationRecord::load(&input.model_evaluation_file_path)?;
        record.promote(
            EvaluatedModel {
                model_path: input.evaluated_model_path.clone(),
                model_accuracy: input.model_accuracy,
                time_stamp: input.time_stamp.clone(),
            },
            &input.time_stamp,
        );
        record.save(&input.model_evaluation_file_path)?;

        info!(file = %export_path.display(), checksum = %checksum, "Model deployed");
        Ok(ModelPusherArtifact {
            is_model_pushed: true,
            message: format!("Model deployed to {}", export_path.display()),
            export_model_file_path: Some(export_path),
            checksum: Some(checksum),
            model_accuracy: input.model_accuracy,
        })
    }
}
