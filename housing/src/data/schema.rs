//! The dataset schema document.

use super::record::{HousingRecord, CATEGORICAL_COLUMN};
use crate::errors::{ConfigError, DataError};
use crate::utils::read_yaml_file;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Expected columns, their kinds and the allowed categorical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Column name to kind (`float` or `category`).
    pub columns: BTreeMap<String, String>,
    pub numerical_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub target_column: String,
    /// Allowed values per categorical column.
    #[serde(default)]
    pub domain_value: BTreeMap<String, Vec<String>>,
}

impl DatasetSchema {
    /// Loads the schema from YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_yaml_file(path)
    }

    /// Allowed values of a categorical column, if the schema restricts it.
    #[must_use]
    pub fn allowed_values(&self, column: &str) -> Option<&[String]> {
        self.domain_value.get(column).map(Vec::as_slice)
    }

    /// Checks a file's header against the schema's column set.
    ///
    /// Column order is not significant; missing and unexpected columns are
    /// both reported.
    pub fn check_columns(&self, path: &Path, headers: &[String]) -> Result<(), DataError> {
        let expected: BTreeSet<&str> = self.columns.keys().map(String::as_str).collect();
        let found: BTreeSet<&str> = headers.iter().map(String::as_str).collect();

        let missing: Vec<&str> = expected.difference(&found).copied().collect();
        let unexpected: Vec<&str> = found.difference(&expected).copied().collect();
        if missing.is_empty() && unexpected.is_empty() && headers.len() == expected.len() {
            return Ok(());
        }

        let mut message = Vec::new();
        if !missing.is_empty() {
            message.push(format!("missing columns [{}]", missing.join(", ")));
        }
        if !unexpected.is_empty() {
            message.push(format!("unexpected columns [{}]", unexpected.join(", ")));
        }
        if message.is_empty() {
            message.push("duplicate columns".to_string());
        }
        Err(DataError::SchemaMismatch {
            path: path.to_path_buf(),
            message: message.join("; "),
        })
    }

    /// Checks every categorical value against the schema's domain.
    pub fn check_domain(&self, records: &[HousingRecord]) -> Result<(), DataError> {
        let Some(allowed) = self.allowed_values(CATEGORICAL_COLUMN) else {
            return Ok(());
        };
        for record in records {
            if !allowed.iter().any(|value| *value == record.ocean_proximity) {
                return Err(DataError::UnknownCategory {
                    column: CATEGORICAL_COLUMN.to_string(),
                    value: record.ocean_proximity.clone(),
                });
            }
        }
        Ok(())
    }
}
