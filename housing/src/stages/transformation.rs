//! Fits the preprocessor and writes the transformed matrices.

use super::Stage;
use crate::config::DataTransformationConfig;
use crate::core::{DataTransformationArtifact, DataValidationArtifact, StageName};
use crate::data::{read_records, write_matrix, DatasetSchema, CATEGORICAL_COLUMN, TARGET_COLUMN};
use crate::errors::HousingResult;
use crate::ml::{targets, Preprocessor};
use crate::utils::write_json_file;
use std::path::Path;
use tracing::info;

/// Imputes, derives, scales and encodes features.
#[derive(Debug)]
pub struct DataTransformation {
    config: DataTransformationConfig,
}

impl DataTransformation {
    /// Creates the stage.
    #[must_use]
    pub fn new(config: DataTransformationConfig) -> Self {
        Self { config }
    }
}

fn output_name(source: &Path) -> String {
    source
        .file_name()
        .map_or_else(|| "housing.csv".to_string(), |n| n.to_string_lossy().into_owned())
}

impl Stage for DataTransformation {
    type Input = DataValidationArtifact;
    type Output = DataTransformationArtifact;

    fn name(&self) -> &str {
        StageName::DataTransformation.as_str()
    }

    fn run(&self, input: DataValidationArtifact) -> HousingResult<DataTransformationArtifact> {
        let schema = DatasetSchema::load(&input.schema_file_path)?;
        let categories = schema
            .allowed_values(CATEGORICAL_COLUMN)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        let train = read_records(&input.train_file_path)?;
        let test = read_records(&input.test_file_path)?;

        let preprocessor = Preprocessor::fit(&train, self.config.add_bedroom_per_room, &categories)?;
        let feature_names = preprocessor.feature_names();
        info!(features = feature_names.len(), "Preprocessor fitted");

        let transformed_train_file_path = self
            .config
            .transformed_train_dir
            .join(output_name(&input.train_file_path));
        let transformed_test_file_path = self
            .config
            .transformed_test_dir
            .join(output_name(&input.test_file_path));

        for (records, path) in [
            (&train, &transformed_train_file_path),
            (&test, &transformed_test_file_path),
        ] {
            let x = preprocessor.transform(records)?;
            let y = targets(records)?;
            write_matrix(path, &feature_names, TARGET_COLUMN, x.view(), y.view())?;
        }
        write_json_file(&self.config.preprocessed_object_file_path, &preprocessor)?;

        Ok(DataTransformationArtifact {
            is_transformed: true,
            message: format!(
                "Data transformation completed: {} features from {} train rows",
                feature_names.len(),
                train.len()
            ),
            transformed_train_file_path,
            transformed_test_file_path,
            preprocessed_object_file_path: self.config.preprocessed_object_file_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{read_matrix, write_records};
    use crate::testing::fixtures::{schema_yaml, synthetic_records};
    use crate::utils::fs::read_json_file;
    use std::fs;

    fn run(add_bedroom_per_room: bool) -> (tempfile::TempDir, DataTransformationArtifact) {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        fs::write(&schema, schema_yaml()).unwrap();
        let train = dir.path().join("ingested/train/housing.csv");
        let test = dir.path().join("ingested/test/housing.csv");
        write_records(&train, &synthetic_records(80, 1)).unwrap();
        write_records(&test, &synthetic_records(20, 2)).unwrap();

        let stage_dir = dir.path().join("data_transformation");
        let stage = DataTransformation::new(DataTransformationConfig {
            add_bedroom_per_room,
            transformed_train_dir: stage_dir.join("transformed_data/train"),
            transformed_test_dir: stage_dir.join("transformed_data/test"),
            preprocessed_object_file_path: stage_dir.join("preprocessed/preprocessed.json"),
        });
        let artifact = stage
            .run(DataValidationArtifact {
                schema_file_path: schema,
                report_file_path: dir.path().join("report.json"),
                report_page_file_path: dir.path().join("report.html"),
                is_validated: true,
                message: String::new(),
                train_file_path: train,
                test_file_path: test,
            })
            .unwrap();
        (dir, artifact)
    }

    #[test]
    fn test_writes_matrices_and_preprocessor() {
        let (_dir, artifact) = run(true);
        assert!(artifact.is_transformed);

        let train = read_matrix(&artifact.transformed_train_file_path).unwrap();
        let test = read_matrix(&artifact.transformed_test_file_path).unwrap();
        assert_eq!(train.features.dim(), (80, 16));
        assert_eq!(test.features.dim(), (20, 16));
        assert_eq!(train.feature_names[15], "ocean_proximity_NEAR OCEAN");

        let preprocessor: Preprocessor =
            read_json_file(&artifact.preprocessed_object_file_path).unwrap();
        assert_eq!(preprocessor.feature_names(), train.feature_names);
    }

    #[test]
    fn test_bedroom_ratio_is_optional() {
        let (_dir, artifact) = run(false);
        let train = read_matrix(&artifact.transformed_train_file_path).unwrap();
        assert_eq!(train.features.ncols(), 15);
        assert!(!train.feature_names.iter().any(|n| n == "bedrooms_per_room"));
    }
}
