//! Assembles the training pipeline for one run.

use crate::config::Configuration;
use crate::core::ModelPusherArtifact;
use crate::errors::HousingResult;
use crate::stages::{
    DataIngestion, DataTransformation, DataValidation, DatasetFetcher, ModelEvaluation,
    ModelPusher, ModelTrainer, StageChain, StageSequence, UrlFetcher,
};
use crate::utils::current_time_stamp;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A runnable training pipeline, from nothing to a deployment record.
pub type TrainingPipeline = Box<dyn StageSequence<(), ModelPusherArtifact>>;

/// Builds a fresh pipeline for each run.
pub trait PipelineFactory: Send + Sync {
    /// Builds the pipeline for the run namespaced by `time_stamp`.
    ///
    /// Configuration errors surface here, before any stage executes.
    fn build(&self, time_stamp: &str) -> HousingResult<TrainingPipeline>;
}

/// Builds the six-stage housing pipeline from the configuration file.
pub struct HousingPipelineFactory {
    root_dir: PathBuf,
    config_path: PathBuf,
    fetcher: Arc<dyn DatasetFetcher>,
}

impl std::fmt::Debug for HousingPipelineFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HousingPipelineFactory")
            .field("root_dir", &self.root_dir)
            .field("config_path", &self.config_path)
            .finish_non_exhaustive()
    }
}

impl HousingPipelineFactory {
    /// Creates a factory that downloads datasets with [`UrlFetcher`].
    #[must_use]
    pub fn new(root_dir: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self::with_fetcher(root_dir, config_path, Arc::new(UrlFetcher::new()))
    }

    /// Creates a factory with a custom dataset fetcher.
    #[must_use]
    pub fn with_fetcher(
        root_dir: impl Into<PathBuf>,
        config_path: impl Into<PathBuf>,
        fetcher: Arc<dyn DatasetFetcher>,
    ) -> Self {
        Self {
            root_dir: root_dir.into(),
            config_path: config_path.into(),
            fetcher,
        }
    }

    /// Returns the configuration file path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the configuration for `time_stamp` and resolves every stage
    /// bundle once, so a broken document is reported immediately.
    pub fn configuration(&self, time_stamp: &str) -> HousingResult<Configuration> {
        let configuration = Configuration::load(&self.config_path, &self.root_dir, time_stamp)?;
        configuration.data_ingestion_config()?;
        configuration.data_validation_config()?;
        configuration.data_transformation_config()?;
        configuration.model_trainer_config()?;
        configuration.model_evaluation_config()?;
        configuration.model_pusher_config()?;
        Ok(configuration)
    }

    /// Checks the configuration without building a pipeline.
    pub fn validate(&self) -> HousingResult<Configuration> {
        self.configuration(&current_time_stamp())
    }
}

impl PipelineFactory for HousingPipelineFactory {
    fn build(&self, time_stamp: &str) -> HousingResult<TrainingPipeline> {
        let configuration = Configuration::load(&self.config_path, &self.root_dir, time_stamp)?;
        let ingestion = DataIngestion::new(
            configuration.data_ingestion_config()?,
            Arc::clone(&self.fetcher),
        );
        let validation = DataValidation::new(configuration.data_validation_config()?);
        let transformation = DataTransformation::new(configuration.data_transformation_config()?);
        let trainer = ModelTrainer::new(configuration.model_trainer_config()?);
        let evaluation = ModelEvaluation::new(configuration.model_evaluation_config()?);
        let pusher = ModelPusher::new(configuration.model_pusher_config()?);

        let chain = StageChain::new(ingestion)
            .then(validation)
            .then(transformation)
            .then(trainer)
            .then(evaluation)
            .then(pusher);
        debug!(time_stamp, stages = ?chain.stage_names(), "Pipeline assembled");
        Ok(Box::new(chain))
    }
}
