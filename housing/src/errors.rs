//! Error types for the housing pipeline and prediction service.
//!
//! Errors fall into three families: configuration errors (raised before any
//! stage runs), stage execution errors (always wrapped in [`StageError`] so the
//! originating stage is known) and serving-time errors ([`PredictionError`]).

use crate::ml::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type HousingResult<T> = Result<T, HousingError>;

/// The main error type for housing operations.
#[derive(Debug, Error)]
pub enum HousingError {
    /// The configuration document or process settings are invalid.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A pipeline stage failed.
    #[error("{0}")]
    Stage(#[from] StageError),

    /// A prediction request failed.
    #[error("{0}")]
    Prediction(#[from] PredictionError),

    /// A dataset did not match expectations.
    #[error("{0}")]
    Data(#[from] DataError),

    /// Model fitting or scoring failed.
    #[error("{0}")]
    Model(#[from] ModelError),

    /// A retraining run is already in flight.
    #[error("A retraining run is already in progress")]
    AlreadyRunning,

    /// Fetching the dataset failed.
    #[error("Download failed for '{url}': {reason}")]
    Download {
        /// The URL that was requested.
        url: String,
        /// Why the download failed.
        reason: String,
    },

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HousingError {
    /// Creates a download error.
    #[must_use]
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error was raised before any stage executed.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns the name of the stage that failed, if any.
    #[must_use]
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            Self::Stage(err) => Some(&err.stage),
            _ => None,
        }
    }
}

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{}': {source}", .path.display())]
    Read {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML.
    #[error("Failed to parse configuration file '{}': {source}", .path.display())]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A required key is absent.
    #[error("Missing configuration key '{key}' in section '{section}'")]
    MissingKey {
        /// The section name (top-level key).
        section: String,
        /// The missing key.
        key: String,
    },

    /// A key is present but has the wrong type.
    #[error("Invalid value for '{section}.{key}': expected {expected}")]
    InvalidValue {
        /// The section name.
        section: String,
        /// The offending key.
        key: String,
        /// What was expected.
        expected: &'static str,
    },

    /// The requested stage configuration has no definition yet.
    #[error("Configuration for '{section}' is not yet supported by this document")]
    NotYetSupported {
        /// The section that was requested.
        section: String,
    },

    /// An environment variable carried an unusable value.
    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv {
        /// The variable name.
        name: String,
        /// The value found.
        value: String,
    },
}

impl ConfigError {
    /// Creates a missing key error.
    #[must_use]
    pub fn missing_key(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingKey {
            section: section.into(),
            key: key.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(
        section: impl Into<String>,
        key: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidValue {
            section: section.into(),
            key: key.into(),
            expected,
        }
    }

    /// Creates a not-yet-supported error.
    #[must_use]
    pub fn not_yet_supported(section: impl Into<String>) -> Self {
        Self::NotYetSupported {
            section: section.into(),
        }
    }
}

/// Error raised when a stage fails, carrying the stage name and root cause.
#[derive(Debug, Error)]
#[error("Stage '{stage}' failed: {source}")]
pub struct StageError {
    /// Stage that failed.
    pub stage: String,
    /// Original error.
    #[source]
    pub source: Box<HousingError>,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(stage: impl Into<String>, source: impl Into<HousingError>) -> Self {
        Self {
            stage: stage.into(),
            source: Box::new(source.into()),
        }
    }

    /// Returns the root cause.
    #[must_use]
    pub fn cause(&self) -> &HousingError {
        &self.source
    }
}

/// Errors raised while serving predictions.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// No deployed model exists under the models directory.
    #[error("No deployed model found in '{}'", .dir.display())]
    ModelNotFound {
        /// The models root that was searched.
        dir: PathBuf,
    },

    /// The feature row was malformed or incompatible with the model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model file exists but could not be loaded.
    #[error("Failed to load model '{}': {reason}", .path.display())]
    ModelLoad {
        /// The model file.
        path: PathBuf,
        /// Why loading failed.
        reason: String,
    },
}

impl PredictionError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Errors raised when a dataset does not match its schema or expectations.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required data file is missing.
    #[error("Data file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A dataset has no rows.
    #[error("Dataset '{}' is empty", .0.display())]
    Empty(PathBuf),

    /// Columns differ from the schema.
    #[error("Schema mismatch in '{}': {message}", .path.display())]
    SchemaMismatch {
        /// The file that was checked.
        path: PathBuf,
        /// What did not match.
        message: String,
    },

    /// A categorical value is outside the schema's domain.
    #[error("Unknown value '{value}' for column '{column}'")]
    UnknownCategory {
        /// The categorical column.
        column: String,
        /// The offending value.
        value: String,
    },

    /// No CSV file was found in a directory.
    #[error("No CSV file found in '{}'", .0.display())]
    NoCsv(PathBuf),
}
