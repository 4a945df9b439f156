//! Loads the newest deployed model and scores single rows.

use super::data::HousingData;
use crate::errors::PredictionError;
use crate::ml::HousingEstimator;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// A loaded estimator with the file path and modification time it came from.
type CachedModel = (PathBuf, SystemTime, Arc<HousingEstimator>);

/// Scores rows with the newest model under a saved models directory.
///
/// Deployed models live at `<model_dir>/<timestamp>/<file>`. The newest
/// version is the numerically greatest timestamp directory; within it the
/// first file by name is the model. The loaded estimator is cached until a
/// newer version appears or the model file is rewritten in place.
#[derive(Debug)]
pub struct HousingPredictor {
    model_dir: PathBuf,
    cache: RwLock<Option<CachedModel>>,
}

impl HousingPredictor {
    /// Creates a predictor over `model_dir`. Nothing is read until the
    /// first prediction.
    #[must_use]
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            cache: RwLock::new(None),
        }
    }

    /// Returns the saved models directory.
    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Finds the file of the newest deployed model.
    pub fn latest_model_path(&self) -> Result<PathBuf, PredictionError> {
        let not_found = || PredictionError::ModelNotFound {
            dir: self.model_dir.clone(),
        };

        let latest = fs::read_dir(&self.model_dir)
            .map_err(|_| not_found())?
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let version = entry.file_name().to_str()?.parse::<u64>().ok()?;
                Some((version, entry.path()))
            })
            .max_by_key(|(version, _)| *version)
            .map(|(_, path)| path)
            .ok_or_else(not_found)?;

        let mut files: Vec<PathBuf> = fs::read_dir(&latest)
            .map_err(|_| not_found())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        files.into_iter().next().ok_or_else(not_found)
    }

    /// Loads the newest model, reusing the cached one if it is still newest.
    pub fn load_latest(&self) -> Result<Arc<HousingEstimator>, PredictionError> {
        let path = self.latest_model_path()?;
        let load_error = |reason: String| PredictionError::ModelLoad {
            path: path.clone(),
            reason,
        };
        let modified = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(|err| load_error(err.to_string()))?;
        if let Some((cached_path, cached_modified, estimator)) = self.cache.read().as_ref() {
            if *cached_path == path && *cached_modified == modified {
                return Ok(Arc::clone(estimator));
            }
        }

        let estimator = HousingEstimator::load(&path)
            .map(Arc::new)
            .map_err(|err| load_error(err.to_string()))?;
        info!(
            model = %path.display(),
            model_name = %estimator.model_name,
            accuracy = estimator.model_accuracy,
            "Deployed model loaded"
        );
        *self.cache.write() = Some((path, modified, Arc::clone(&estimator)));
        Ok(estimator)
    }

    /// Predicts the median house value for one row.
    pub fn predict(&self, data: &HousingData) -> Result<f64, PredictionError> {
        let estimator = self.load_latest()?;
        let value = estimator
            .predict(&data.to_record())
            .map_err(|err| PredictionError::invalid_input(err.to_string()))?;
        debug!(value, "Prediction served");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{targets, Preprocessor, RidgeRegression};
    use crate::testing::fixtures::{ocean_proximity_domain, sample_record, synthetic_records};
    use std::time::Duration;

    fn estimator(name: &str) -> HousingEstimator {
        let records = synthetic_records(200, 3);
        let pre = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();
        let x = pre.transform(&records).unwrap();
        let y = targets(&records).unwrap();
        let model = RidgeRegression::fit(x.view(), y.view(), 1.0).unwrap();
        HousingEstimator::new(name, 0.9, pre, model).unwrap()
    }

    fn sample_data() -> HousingData {
        let record = sample_record();
        HousingData::new(
            record.numeric_values().map(|v| v.unwrap()),
            record.ocean_proximity,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_directory_is_model_not_found() {
        let predictor = HousingPredictor::new("/definitely/not/saved_models");
        assert!(matches!(
            predictor.predict(&sample_data()),
            Err(PredictionError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_directory_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("20240101000000")).unwrap();
        fs::create_dir_all(dir.path().join("not-a-version")).unwrap();

        let predictor = HousingPredictor::new(dir.path());
        assert!(matches!(
            predictor.latest_model_path(),
            Err(PredictionError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn test_picks_newest_version() {
        let dir = tempfile::tempdir().unwrap();
        estimator("old").save(&dir.path().join("20240101000000/model.json")).unwrap();
        estimator("new").save(&dir.path().join("20240301000000/model.json")).unwrap();
        estimator("other").save(&dir.path().join("latest/model.json")).unwrap();

        let predictor = HousingPredictor::new(dir.path());
        assert_eq!(
            predictor.latest_model_path().unwrap(),
            dir.path().join("20240301000000/model.json")
        );
        assert_eq!(predictor.load_latest().unwrap().model_name, "new");

        estimator("newest").save(&dir.path().join("20240401000000/model.json")).unwrap();
        assert_eq!(predictor.load_latest().unwrap().model_name, "newest");
    }

    #[test]
    fn test_predicts_finite_value() {
        let dir = tempfile::tempdir().unwrap();
        estimator("ridge").save(&dir.path().join("20240101000000/model.json")).unwrap();

        let predictor = HousingPredictor::new(dir.path());
        let first = predictor.predict(&sample_data()).unwrap();
        assert!(first.is_finite());
        assert_eq!(predictor.predict(&sample_data()).unwrap(), first);
    }

    #[test]
    fn test_unknown_category_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        estimator("ridge").save(&dir.path().join("20240101000000/model.json")).unwrap();

        let mut data = sample_data();
        data.ocean_proximity = "MOON".to_string();
        assert!(matches!(
            HousingPredictor::new(dir.path()).predict(&data),
            Err(PredictionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_extreme_values_are_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        estimator("ridge").save(&dir.path().join("20240101000000/model.json")).unwrap();

        let data = HousingData::new([1e308; 8], "INLAND").unwrap();
        assert!(matches!(
            HousingPredictor::new(dir.path()).predict(&data),
            Err(PredictionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_model_rewritten_in_place_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240101000000/model.json");
        estimator("first").save(&path).unwrap();

        let predictor = HousingPredictor::new(dir.path());
        assert_eq!(predictor.load_latest().unwrap().model_name, "first");

        estimator("second").save(&path).unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();
        assert_eq!(predictor.load_latest().unwrap().model_name, "second");
    }

    #[test]
    fn test_corrupt_model_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240101000000/model.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            HousingPredictor::new(dir.path()).load_latest(),
            Err(PredictionError::ModelLoad { .. })
        ));
    }
}
