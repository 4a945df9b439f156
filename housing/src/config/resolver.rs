//! Resolves the configuration document into per-stage bundles.

use super::constants::*;
use super::document::ConfigDocument;
use super::entity::{
    DataIngestionConfig, DataTransformationConfig, DataValidationConfig, ModelEvaluationConfig,
    ModelPusherConfig, ModelTrainerConfig, TrainingPipelineConfig,
};
use crate::errors::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolves stage configurations for one pipeline run.
///
/// Resolution is pure string/path concatenation over the loaded document,
/// the project root and the run timestamp. Directories are never created
/// here; each stage creates what it writes.
#[derive(Debug, Clone)]
pub struct Configuration {
    document: ConfigDocument,
    root_dir: PathBuf,
    time_stamp: String,
    training_pipeline_config: TrainingPipelineConfig,
}

impl Configuration {
    /// Loads the document at `config_file_path` and prepares resolution for
    /// the run identified by `time_stamp`.
    pub fn load(
        config_file_path: &Path,
        root_dir: impl Into<PathBuf>,
        time_stamp: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let document = ConfigDocument::load(config_file_path)?;
        Self::new(document, root_dir, time_stamp)
    }

    /// Creates a resolver over an already-parsed document.
    pub fn new(
        document: ConfigDocument,
        root_dir: impl Into<PathBuf>,
        time_stamp: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let root_dir = root_dir.into();
        let training_pipeline_config = resolve_training_pipeline_config(&document, &root_dir)?;

        Ok(Self {
            document,
            root_dir,
            time_stamp: time_stamp.into(),
            training_pipeline_config,
        })
    }

    /// Returns the run timestamp used to namespace artifact directories.
    #[must_use]
    pub fn time_stamp(&self) -> &str {
        &self.time_stamp
    }

    /// Returns the project root every relative path is joined onto.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Returns the resolved artifact root.
    #[must_use]
    pub fn training_pipeline_config(&self) -> &TrainingPipelineConfig {
        &self.training_pipeline_config
    }

    fn stage_artifact_dir(&self, stage_dir_name: &str) -> PathBuf {
        self.training_pipeline_config
            .artifact_dir
            .join(stage_dir_name)
            .join(&self.time_stamp)
    }

    /// Resolves the ingestion bundle.
    pub fn data_ingestion_config(&self) -> Result<DataIngestionConfig, ConfigError> {
        let section = self.document.section(DATA_INGESTION_CONFIG_KEY)?;
        let artifact_dir = self.stage_artifact_dir(DATA_INGESTION_ARTIFACT_DIR_NAME);
        let ingested_dir = artifact_dir.join(section.string(DATA_INGESTION_INGESTED_DIR_KEY)?);

        let config = DataIngestionConfig {
            dataset_download_url: section.string(DATA_INGESTION_DOWNLOAD_URL_KEY)?,
            tgz_download_dir: artifact_dir.join(section.string(DATA_INGESTION_TGZ_DOWNLOAD_DIR_KEY)?),
            raw_data_dir: artifact_dir.join(section.string(DATA_INGESTION_RAW_DATA_DIR_KEY)?),
            ingested_train_dir: ingested_dir
                .join(section.string(DATA_INGESTION_INGESTED_TRAIN_DIR_KEY)?),
            ingested_test_dir: ingested_dir.join(section.string(DATA_INGESTION_INGESTED_TEST_DIR_KEY)?),
        };

        info!(?config, "Data ingestion config resolved");
        Ok(config)
    }

    /// Resolves the validation bundle.
    pub fn data_validation_config(&self) -> Result<DataValidationConfig, ConfigError> {
        let section = self.document.section(DATA_VALIDATION_CONFIG_KEY)?;
        let artifact_dir = self.stage_artifact_dir(DATA_VALIDATION_ARTIFACT_DIR_NAME);

        let config = DataValidationConfig {
            schema_file_path: self
                .root_dir
                .join(section.string(DATA_VALIDATION_SCHEMA_DIR_KEY)?)
                .join(section.string(DATA_VALIDATION_SCHEMA_FILE_NAME_KEY)?),
            report_file_path: artifact_dir.join(section.string(DATA_VALIDATION_REPORT_FILE_NAME_KEY)?),
            report_page_file_path: artifact_dir
                .join(section.string(DATA_VALIDATION_REPORT_PAGE_FILE_NAME_KEY)?),
        };

        info!(?config, "Data validation config resolved");
        Ok(config)
    }

    /// Resolves the transformation bundle.
    pub fn data_transformation_config(&self) -> Result<DataTransformationConfig, ConfigError> {
        let section = self.document.section(DATA_TRANSFORMATION_CONFIG_KEY)?;
        let artifact_dir = self.stage_artifact_dir(DATA_TRANSFORMATION_ARTIFACT_DIR_NAME);
        let transformed_dir = artifact_dir.join(section.string(DATA_TRANSFORMATION_TRANSFORMED_DIR_KEY)?);

        let config = DataTransformationConfig {
            add_bedroom_per_room: section.bool(DATA_TRANSFORMATION_ADD_BEDROOM_PER_ROOM_KEY)?,
            transformed_train_dir: transformed_dir
                .join(section.string(DATA_TRANSFORMATION_TRANSFORMED_TRAIN_DIR_KEY)?),
            transformed_test_dir: transformed_dir
                .join(section.string(DATA_TRANSFORMATION_TRANSFORMED_TEST_DIR_KEY)?),
            preprocessed_object_file_path: artifact_dir
                .join(section.string(DATA_TRANSFORMATION_PREPROCESSING_DIR_KEY)?)
                .join(section.string(DATA_TRANSFORMATION_PREPROCESSED_FILE_NAME_KEY)?),
        };

        info!(?config, "Data transformation config resolved");
        Ok(config)
    }

    /// Resolves the trainer bundle.
    pub fn model_trainer_config(&self) -> Result<ModelTrainerConfig, ConfigError> {
        let section = self.document.section(MODEL_TRAINER_CONFIG_KEY)?;
        let artifact_dir = self.stage_artifact_dir(MODEL_TRAINER_ARTIFACT_DIR_NAME);

        let config = ModelTrainerConfig {
            trained_model_file_path: artifact_dir
                .join(section.string(MODEL_TRAINER_TRAINED_MODEL_DIR_KEY)?)
                .join(section.string(MODEL_TRAINER_TRAINED_MODEL_FILE_NAME_KEY)?),
            base_accuracy: section.f64(MODEL_TRAINER_BASE_ACCURACY_KEY)?,
            model_config_file_path: self
                .root_dir
                .join(section.string(MODEL_TRAINER_MODEL_CONFIG_DIR_KEY)?)
                .join(section.string(MODEL_TRAINER_MODEL_CONFIG_FILE_NAME_KEY)?),
        };

        info!(?config, "Model trainer config resolved");
        Ok(config)
    }

    /// Resolves the evaluation bundle.
    ///
    /// Documents without a `model_evaluation_config` section yield
    /// [`ConfigError::NotYetSupported`].
    pub fn model_evaluation_config(&self) -> Result<ModelEvaluationConfig, ConfigError> {
        let section = self
            .document
            .optional_section(MODEL_EVALUATION_CONFIG_KEY)?
            .ok_or_else(|| ConfigError::not_yet_supported(MODEL_EVALUATION_CONFIG_KEY))?;

        let config = ModelEvaluationConfig {
            model_evaluation_file_path: self
                .training_pipeline_config
                .artifact_dir
                .join(MODEL_EVALUATION_ARTIFACT_DIR_NAME)
                .join(section.string(MODEL_EVALUATION_FILE_NAME_KEY)?),
            time_stamp: self.time_stamp.clone(),
        };

        info!(?config, "Model evaluation config resolved");
        Ok(config)
    }

    /// Root of deployed model versions, `<root>/<model_export_dir>`.
    ///
    /// The pusher writes under it and the predictor reads from it.
    pub fn saved_models_dir(&self) -> Result<PathBuf, ConfigError> {
        let section = self
            .document
            .optional_section(MODEL_PUSHER_CONFIG_KEY)?
            .ok_or_else(|| ConfigError::not_yet_supported(MODEL_PUSHER_CONFIG_KEY))?;
        Ok(self
            .root_dir
            .join(section.string(MODEL_PUSHER_MODEL_EXPORT_DIR_KEY)?))
    }

    /// Resolves the pusher bundle.
    ///
    /// Documents without a `model_pusher_config` section yield
    /// [`ConfigError::NotYetSupported`].
    pub fn model_pusher_config(&self) -> Result<ModelPusherConfig, ConfigError> {
        let config = ModelPusherConfig {
            export_dir_path: self.saved_models_dir()?.join(&self.time_stamp),
        };

        info!(?config, "Model pusher config resolved");
        Ok(config)
    }
}

fn resolve_training_pipeline_config(
    document: &ConfigDocument,
    root_dir: &Path,
) -> Result<TrainingPipelineConfig, ConfigError> {
    let section = document.section(TRAINING_PIPELINE_CONFIG_KEY)?;
    let config = TrainingPipelineConfig {
        artifact_dir: root_dir
            .join(section.string(TRAINING_PIPELINE_NAME_KEY)?)
            .join(section.string(TRAINING_PIPELINE_ARTIFACT_DIR_KEY)?),
    };

    info!(?config, "Training pipeline config resolved");
    Ok(config)
}
