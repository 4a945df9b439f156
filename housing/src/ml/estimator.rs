//! The deployable estimator: a fitted preprocessor plus a regression model.

use super::error::ModelError;
use super::linear::RidgeRegression;
use super::preprocessing::Preprocessor;
use crate::data::HousingRecord;
use crate::errors::HousingResult;
use crate::utils::fs::{read_json_file, write_json_file};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A model that scores raw housing rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingEstimator {
    /// Name of the candidate that won selection.
    pub model_name: String,
    /// Harmonic mean of train and test R² at training time.
    pub model_accuracy: f64,
    pub preprocessor: Preprocessor,
    pub model: RidgeRegression,
}

impl HousingEstimator {
    /// Bundles a fitted preprocessor and model.
    pub fn new(
        model_name: impl Into<String>,
        model_accuracy: f64,
        preprocessor: Preprocessor,
        model: RidgeRegression,
    ) -> Result<Self, ModelError> {
        if preprocessor.n_features() != model.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: preprocessor.n_features(),
                got: model.n_features(),
            });
        }
        Ok(Self {
            model_name: model_name.into(),
            model_accuracy,
            preprocessor,
            model,
        })
    }

    /// Scores one raw row.
    pub fn predict(&self, record: &HousingRecord) -> Result<f64, ModelError> {
        let row = self.preprocessor.transform_record(record)?;
        let value = self.model.predict_row(&row)?;
        if !value.is_finite() {
            return Err(ModelError::NonFinitePrediction { value });
        }
        Ok(value)
    }

    /// Scores many raw rows.
    pub fn predict_batch(&self, records: &[HousingRecord]) -> Result<Array1<f64>, ModelError> {
        let matrix = self.preprocessor.transform(records)?;
        let values = self.model.predict(matrix.view())?;
        if let Some(value) = values.iter().find(|v| !v.is_finite()) {
            return Err(ModelError::NonFinitePrediction { value: *value });
        }
        Ok(values)
    }

    /// Writes the estimator as JSON.
    pub fn save(&self, path: &Path) -> HousingResult<()> {
        write_json_file(path, self)
    }

    /// Reads an estimator written by [`HousingEstimator::save`].
    pub fn load(path: &Path) -> HousingResult<Self> {
        read_json_file(path)
    }
}
