//! Error type for model fitting and scoring.

use thiserror::Error;

/// Errors raised while fitting or applying a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No rows were supplied where some were required.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The regularized normal equations have no unique solution.
    #[error("Singular system while fitting: pivot {pivot} in column {column}")]
    SingularMatrix {
        /// Column where elimination broke down.
        column: usize,
        /// Magnitude of the offending pivot.
        pivot: f64,
    },

    /// A row or matrix does not have the expected number of features.
    #[error("Feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch {
        /// Features the model was fitted on.
        expected: usize,
        /// Features supplied.
        got: usize,
    },

    /// A feature (raw or derived) is NaN or infinite.
    #[error("Feature '{feature}' is not finite")]
    NonFiniteFeature {
        /// Feature name.
        feature: String,
    },

    /// The model produced NaN or an infinite value.
    #[error("Prediction is not finite: {value}")]
    NonFinitePrediction {
        /// The offending output.
        value: f64,
    },

    /// A categorical value was not seen when the encoder was fitted.
    #[error("Unknown category '{value}' for '{column}'")]
    UnknownCategory {
        /// Categorical column.
        column: String,
        /// Offending value.
        value: String,
    },

    /// A hyperparameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No candidate met the accuracy requirements.
    #[error("No model met base accuracy {base_accuracy}: best candidate scored {best_accuracy}")]
    BaseAccuracyNotMet {
        /// Required accuracy.
        base_accuracy: f64,
        /// Best accuracy among all candidates.
        best_accuracy: f64,
    },
}
