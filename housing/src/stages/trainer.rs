//! Fits the candidate models and keeps the best acceptable one.

use super::Stage;
use crate::config::ModelTrainerConfig;
use crate::core::{DataTransformationArtifact, ModelTrainerArtifact, StageName};
use crate::data::{read_matrix, FeatureMatrix};
use crate::errors::{ConfigError, HousingResult};
use crate::ml::{harmonic_mean, r2_score, rmse, HousingEstimator, ModelError, Preprocessor, RidgeRegression};
use crate::utils::fs::read_json_file;
use crate::utils::read_yaml_file;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Largest accepted difference between train and test R².
pub const MAX_TRAIN_TEST_GAP: f64 = 0.05;

/// One ridge configuration to try.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub name: String,
    /// L2 penalty, strictly positive.
    pub alpha: f64,
}

/// The model configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub candidates: Vec<ModelCandidate>,
}

impl ModelCatalog {
    /// Loads the catalog from YAML; an empty candidate list is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let catalog: Self = read_yaml_file(path)?;
        if catalog.candidates.is_empty() {
            return Err(ConfigError::invalid_value(
                path.display().to_string(),
                "candidates",
                "at least one candidate",
            ));
        }
        Ok(catalog)
    }
}

#[derive(Debug, Clone)]
struct Scored {
    candidate: ModelCandidate,
    model: RidgeRegression,
    train_rmse: f64,
    test_rmse: f64,
    train_r2: f64,
    test_r2: f64,
    accuracy: f64,
}

impl Scored {
    fn is_acceptable(&self, base_accuracy: f64) -> bool {
        self.accuracy >= base_accuracy && (self.train_r2 - self.test_r2).abs() < MAX_TRAIN_TEST_GAP
    }
}

/// Trains ridge regressions and persists the winning estimator.
#[derive(Debug)]
pub struct ModelTrainer {
    config: ModelTrainerConfig,
}

impl ModelTrainer {
    /// Creates the stage.
    #[must_use]
    pub fn new(config: ModelTrainerConfig) -> Self {
        Self { config }
    }

    fn score(
        candidate: &ModelCandidate,
        train: &FeatureMatrix,
        test: &FeatureMatrix,
    ) -> Result<Scored, ModelError> {
        let model = RidgeRegression::fit(train.features.view(), train.target.view(), candidate.alpha)?;
        let train_pred = model.predict(train.features.view())?;
        let test_pred = model.predict(test.features.view())?;

        let train_r2 = r2_score(train.target.view(), train_pred.view());
        let test_r2 = r2_score(test.target.view(), test_pred.view());
        Ok(Scored {
            candidate: candidate.clone(),
            train_rmse: rmse(train.target.view(), train_pred.view()),
            test_rmse: rmse(test.target.view(), test_pred.view()),
            accuracy: harmonic_mean(train_r2, test_r2),
            train_r2,
            test_r2,
            model,
        })
    }
}

impl Stage for ModelTrainer {
    type Input = DataTransformationArtifact;
    type Output = ModelTrainerArtifact;

    fn name(&self) -> &str {
        StageName::ModelTrainer.as_str()
    }

    fn run(&self, input: DataTransformationArtifact) -> HousingResult<ModelTrainerArtifact> {
        let catalog = ModelCatalog::load(&self.config.model_config_file_path)?;
        let train = read_matrix(&input.transformed_train_file_path)?;
        let test = read_matrix(&input.transformed_test_file_path)?;
        if train.features.ncols() != test.features.ncols() {
            return Err(ModelError::FeatureMismatch {
                expected: train.features.ncols(),
                got: test.features.ncols(),
            }
            .into());
        }

        let mut scored = Vec::with_capacity(catalog.candidates.len());
        for candidate in &catalog.candidates {
            let result = Self::score(candidate, &train, &test)?;
            debug!(
                candidate = %candidate.name,
                alpha = candidate.alpha,
                train_r2 = result.train_r2,
                test_r2 = result.test_r2,
                accuracy = result.accuracy,
                "Candidate scored"
            );
            scored.push(result);
        }

        let best_accuracy = scored.iter().map(|s| s.accuracy).fold(f64::NEG_INFINITY, f64::max);
        let best = scored
            .into_iter()
            .filter(|s| s.is_acceptable(self.config.base_accuracy))
            .max_by(|a, b| a.accuracy.total_cmp(&b.accuracy))
            .ok_or(ModelError::BaseAccuracyNotMet {
                base_accuracy: self.config.base_accuracy,
                best_accuracy,
            })?;

        let preprocessor: Preprocessor = read_json_file(&input.preprocessed_object_file_path)?;
        let estimator = HousingEstimator::new(
            best.candidate.name.clone(),
            best.accuracy,
            preprocessor,
            best.model,
        )?;
        estimator.save(&self.config.trained_model_file_path)?;

        info!(
            model = %best.candidate.name,
            train_r2 = best.train_r2,
            test_r2 = best.test_r2,
            accuracy = best.accuracy,
            "Model selected"
        );
        Ok(ModelTrainerArtifact {
            is_trained: true,
            message: format!(
                "Model '{}' trained with accuracy {:.4}",
                best.candidate.name, best.accuracy
            ),
            trained_model_file_path: self.config.trained_model_file_path.clone(),
            train_rmse: best.train_rmse,
            test_rmse: best.test_rmse,
            train_accuracy: best.train_r2,
            test_accuracy: best.test_r2,
            model_accuracy: best.accuracy,
        })
    }
}
