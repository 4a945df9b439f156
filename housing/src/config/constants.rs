//! Key names and fixed directory names used by the configuration resolver.

#![allow(missing_docs)]

/// Default config directory relative to the project root.
pub const CONFIG_DIR: &str = "config";
/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

// Training pipeline
pub const TRAINING_PIPELINE_CONFIG_KEY: &str = "training_pipeline_config";
pub const TRAINING_PIPELINE_ARTIFACT_DIR_KEY: &str = "artifact_dir";
pub const TRAINING_PIPELINE_NAME_KEY: &str = "pipeline_name";

// Experiment history
pub const EXPERIMENT_DIR_NAME: &str = "experiment";
pub const EXPERIMENT_FILE_NAME: &str = "experiment.csv";

// Data ingestion
pub const DATA_INGESTION_CONFIG_KEY: &str = "data_ingestion_config";
pub const DATA_INGESTION_ARTIFACT_DIR_NAME: &str = "data_ingestion";
pub const DATA_INGESTION_DOWNLOAD_URL_KEY: &str = "dataset_download_url";
pub const DATA_INGESTION_RAW_DATA_DIR_KEY: &str = "raw_data_dir";
pub const DATA_INGESTION_TGZ_DOWNLOAD_DIR_KEY: &str = "tgz_download_dir";
pub const DATA_INGESTION_INGESTED_DIR_KEY: &str = "ingested_dir";
pub const DATA_INGESTION_INGESTED_TRAIN_DIR_KEY: &str = "ingested_train_dir";
pub const DATA_INGESTION_INGESTED_TEST_DIR_KEY: &str = "ingested_test_dir";

// Data validation
pub const DATA_VALIDATION_CONFIG_KEY: &str = "data_validation_config";
pub const DATA_VALIDATION_ARTIFACT_DIR_NAME: &str = "data_validation";
pub const DATA_VALIDATION_SCHEMA_DIR_KEY: &str = "schema_dir";
pub const DATA_VALIDATION_SCHEMA_FILE_NAME_KEY: &str = "schema_file_name";
pub const DATA_VALIDATION_REPORT_FILE_NAME_KEY: &str = "report_file_name";
pub const DATA_VALIDATION_REPORT_PAGE_FILE_NAME_KEY: &str = "report_page_file_name";

// Data transformation
pub const DATA_TRANSFORMATION_CONFIG_KEY: &str = "data_transformation_config";
pub const DATA_TRANSFORMATION_ARTIFACT_DIR_NAME: &str = "data_transformation";
pub const DATA_TRANSFORMATION_ADD_BEDROOM_PER_ROOM_KEY: &str = "add_bedroom_per_room";
pub const DATA_TRANSFORMATION_TRANSFORMED_DIR_KEY: &str = "transformed_dir";
pub const DATA_TRANSFORMATION_TRANSFORMED_TRAIN_DIR_KEY: &str = "transformed_train_dir";
pub const DATA_TRANSFORMATION_TRANSFORMED_TEST_DIR_KEY: &str = "transformed_test_dir";
pub const DATA_TRANSFORMATION_PREPROCESSING_DIR_KEY: &str = "preprocessing_dir";
pub const DATA_TRANSFORMATION_PREPROCESSED_FILE_NAME_KEY: &str = "preprocessed_object_file_name";

// Model trainer
pub const MODEL_TRAINER_CONFIG_KEY: &str = "model_trainer_config";
pub const MODEL_TRAINER_ARTIFACT_DIR_NAME: &str = "model_trainer";
pub const MODEL_TRAINER_TRAINED_MODEL_DIR_KEY: &str = "trained_model_dir";
pub const MODEL_TRAINER_TRAINED_MODEL_FILE_NAME_KEY: &str = "model_file_name";
pub const MODEL_TRAINER_BASE_ACCURACY_KEY: &str = "base_accuracy";
pub const MODEL_TRAINER_MODEL_CONFIG_DIR_KEY: &str = "model_config_dir";
pub const MODEL_TRAINER_MODEL_CONFIG_FILE_NAME_KEY: &str = "model_config_file_name";

// Model evaluation
pub const MODEL_EVALUATION_CONFIG_KEY: &str = "model_evaluation_config";
pub const MODEL_EVALUATION_ARTIFACT_DIR_NAME: &str = "model_evaluation";
pub const MODEL_EVALUATION_FILE_NAME_KEY: &str = "model_evaluation_file_name";

// Model pusher
pub const MODEL_PUSHER_CONFIG_KEY: &str = "model_pusher_config";
pub const MODEL_PUSHER_MODEL_EXPORT_DIR_KEY: &str = "model_export_dir";
