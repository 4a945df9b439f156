//! Schema checks and the train/test drift report.

use super::Stage;
use crate::config::DataValidationConfig;
use crate::core::{DataIngestionArtifact, DataValidationArtifact, StageName};
use crate::data::{read_headers, read_records, DatasetSchema, HousingRecord, NUMERIC_COLUMNS};
use crate::errors::{DataError, HousingResult};
use crate::utils::fs::{ensure_parent, write_json_file};
use crate::utils::timestamps::{now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Standardized mean shift above which a column is flagged as drifted.
pub const DRIFT_THRESHOLD: f64 = 0.25;

/// Summary statistics of one numeric column in both splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column: String,
    pub train_mean: f64,
    pub train_std: f64,
    pub train_missing: usize,
    pub test_mean: f64,
    pub test_std: f64,
    pub test_missing: usize,
    /// `|test_mean - train_mean| / train_std`.
    pub mean_shift: f64,
    pub drifted: bool,
}

/// Drift between the train and test splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: Timestamp,
    pub train_rows: usize,
    pub test_rows: usize,
    pub threshold: f64,
    pub columns: Vec<ColumnDrift>,
}

impl DriftReport {
    /// Compares every numeric column of the two splits.
    #[must_use]
    pub fn compute(train: &[HousingRecord], test: &[HousingRecord]) -> Self {
        let columns = NUMERIC_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let (train_mean, train_std, train_missing) = column_stats(train, i);
                let (test_mean, test_std, test_missing) = column_stats(test, i);
                let mean_shift = if train_std > 0.0 {
                    (test_mean - train_mean).abs() / train_std
                } else {
                    0.0
                };
                ColumnDrift {
                    column: (*column).to_string(),
                    train_mean,
                    train_std,
                    train_missing,
                    test_mean,
                    test_std,
                    test_missing,
                    mean_shift,
                    drifted: mean_shift > DRIFT_THRESHOLD,
                }
            })
            .collect();

        Self {
            generated_at: now_utc(),
            train_rows: train.len(),
            test_rows: test.len(),
            threshold: DRIFT_THRESHOLD,
            columns,
        }
    }

    /// Names of the drifted columns.
    #[must_use]
    pub fn drifted_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.drifted)
            .map(|c| c.column.as_str())
            .collect()
    }

    /// Renders the report as a standalone HTML page.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut rows = String::new();
        for c in &self.columns {
            let _ = write!(
                rows,
                "<tr{}><td>{}</td><td>{:.4}</td><td>{:.4}</td><td>{}</td>\
                 <td>{:.4}</td><td>{:.4}</td><td>{}</td><td>{:.4}</td></tr>\n",
                if c.drifted { " class=\"drift\"" } else { "" },
                c.column,
                c.train_mean,
                c.train_std,
                c.train_missing,
                c.test_mean,
                c.test_std,
                c.test_missing,
                c.mean_shift,
            );
        }
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Data drift report</title>\
             <style>table{{border-collapse:collapse}}td,th{{border:1px solid #999;padding:4px}}\
             .drift{{background:#fdd}}</style></head><body>\n\
             <h1>Data drift report</h1>\n<p>Generated {} &middot; {} train rows &middot; {} test rows \
             &middot; threshold {}</p>\n<table>\n<tr><th>column</th><th>train mean</th><th>train std</th>\
             <th>train missing</th><th>test mean</th><th>test std</th><th>test missing</th>\
             <th>mean shift</th></tr>\n{}</table>\n</body></html>\n",
            self.generated_at.to_rfc3339(),
            self.train_rows,
            self.test_rows,
            self.threshold,
            rows
        )
    }
}

/// Mean, population standard deviation and gap count of one numeric column.
fn column_stats(records: &[HousingRecord], index: usize) -> (f64, f64, usize) {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.numeric_values()[index])
        .collect();
    let missing = records.len() - values.len();
    if values.is_empty() {
        return (0.0, 0.0, missing);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt(), missing)
}

/// Checks both splits against the schema and writes the drift report.
#[derive(Debug)]
pub struct DataValidation {
    config: DataValidationConfig,
}

impl DataValidation {
    /// Creates the stage.
    #[must_use]
    pub fn new(config: DataValidationConfig) -> Self {
        Self { config }
    }

    fn validate_split(&self, schema: &DatasetSchema, path: &Path) -> HousingResult<Vec<HousingRecord>> {
        let headers = read_headers(path)?;
        schema.check_columns(path, &headers)?;

        let records = read_records(path)?;
        schema.check_domain(&records)?;
        if let Some(row) = records.iter().position(|r| r.median_house_value.is_none()) {
            return Err(DataError::SchemaMismatch {
                path: path.to_path_buf(),
                message: format!("row {} has no '{}'", row + 1, schema.target_column),
            }
            .into());
        }
        Ok(records)
    }

    fn write_report(&self, report: &DriftReport) -> HousingResult<()> {
        write_json_file(&self.config.report_file_path, report)?;
        ensure_parent(&self.config.report_page_file_path)?;
        fs::write(&self.config.report_page_file_path, report.to_html())?;
        Ok(())
    }
}

impl Stage for DataValidation {
    type Input = DataIngestionArtifact;
    type Output = DataValidationArtifact;

    fn name(&self) -> &str {
        StageName::DataValidation.as_str()
    }

    fn run(&self, input: DataIngestionArtifact) -> HousingResult<DataValidationArtifact> {
        let schema = DatasetSchema::load(&self.config.schema_file_path)?;
        let train = self.validate_split(&schema, &input.train_file_path)?;
        let test = self.validate_split(&schema, &input.test_file_path)?;

        let report = DriftReport::compute(&train, &test);
        self.write_report(&report)?;

        let drifted = report.drifted_columns();
        if drifted.is_empty() {
            info!("No drift between train and test splits");
        } else {
            warn!(columns = ?drifted, "Drift detected between train and test splits");
        }

        Ok(DataValidationArtifact {
            schema_file_path: self.config.schema_file_path.clone(),
            report_file_path: self.config.report_file_path.clone(),
            report_page_file_path: self.config.report_page_file_path.clone(),
            is_validated: true,
            message: format!(
                "Data validation passed; {} of {} numeric columns drifted",
                drifted.len(),
                report.columns.len()
            ),
            train_file_path: input.train_file_path,
            test_file_path: input.test_file_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HousingError;
    use crate::testing::fixtures::{schema_yaml, synthetic_records, write_housing_csv};
    use std::path::PathBuf;

    struct Setup {
        _dir: tempfile::TempDir,
        stage: DataValidation,
        config: DataValidationConfig,
        train: PathBuf,
        test: PathBuf,
    }

    fn setup() -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("config/schema.yaml");
        ensure_parent(&schema).unwrap();
        fs::write(&schema, schema_yaml()).unwrap();

        let train = dir.path().join("train/housing.csv");
        let test = dir.path().join("test/housing.csv");
        write_housing_csv(&train, &synthetic_records(80, 1)).unwrap();
        write_housing_csv(&test, &synthetic_records(20, 2)).unwrap();

        let config = DataValidationConfig {
            schema_file_path: schema,
            report_file_path: dir.path().join("data_validation/report.json"),
            report_page_file_path: dir.path().join("data_validation/report.html"),
        };
        Setup {
            stage: DataValidation::new(config.clone()),
            config,
            train,
            test,
            _dir: dir,
        }
    }

    fn ingestion(setup: &Setup) -> DataIngestionArtifact {
        DataIngestionArtifact {
            train_file_path: setup.train.clone(),
            test_file_path: setup.test.clone(),
            is_ingested: true,
            message: String::new(),
        }
    }

    #[test]
    fn test_valid_splits_pass_and_write_reports() {
        let setup = setup();
        let artifact = setup.stage.run(ingestion(&setup)).unwrap();

        assert!(artifact.is_validated);
        assert_eq!(artifact.train_file_path, setup.train);
        assert!(setup.config.report_file_path.exists());
        let page = fs::read_to_string(&setup.config.report_page_file_path).unwrap();
        assert!(page.contains("<h1>Data drift report</h1>"));
        assert!(page.contains("median_income"));
    }

    #[test]
    fn test_missing_column_fails() {
        let setup = setup();
        let content = fs::read_to_string(&setup.test).unwrap();
        let renamed = content.replacen("ocean_proximity", "proximity", 1);
        fs::write(&setup.test, renamed).unwrap();

        let err = setup.stage.run(ingestion(&setup)).unwrap_err();
        assert!(matches!(err, HousingError::Data(DataError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_unknown_category_fails() {
        let setup = setup();
        let mut records = synthetic_records(10, 3);
        records[4].ocean_proximity = "DESERT".to_string();
        write_housing_csv(&setup.train, &records).unwrap();

        let err = setup.stage.run(ingestion(&setup)).unwrap_err();
        assert!(matches!(err, HousingError::Data(DataError::UnknownCategory { .. })));
    }

    #[test]
    fn test_missing_test_file_fails() {
        let setup = setup();
        fs::remove_file(&setup.test).unwrap();
        let err = setup.stage.run(ingestion(&setup)).unwrap_err();
        assert!(matches!(err, HousingError::Data(DataError::MissingFile(_))));
    }

    #[test]
    fn test_drift_flags_shifted_column() {
        let train = synthetic_records(200, 4);
        let mut test = train.clone();
        for r in &mut test {
            r.median_income = r.median_income.map(|v| v + 10.0);
        }

        let report = DriftReport::compute(&train, &test);
        assert_eq!(report.drifted_columns(), vec!["median_income"]);
    }
}
