//! Numeric feature matrices stored as CSV.
//!
//! The last column of a matrix file is the target.

use crate::errors::{DataError, HousingResult};
use crate::utils::fs::ensure_parent;
use csv::{ReaderBuilder, WriterBuilder};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::path::Path;

/// A feature matrix with its target column, as read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// Feature column names.
    pub feature_names: Vec<String>,
    pub features: Array2<f64>,
    pub target: Array1<f64>,
}

/// Writes features and target as CSV with a header row.
pub fn write_matrix(
    path: &Path,
    feature_names: &[String],
    target_name: &str,
    features: ArrayView2<'_, f64>,
    target: ArrayView1<'_, f64>,
) -> HousingResult<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut header: Vec<&str> = feature_names.iter().map(String::as_str).collect();
    header.push(target_name);
    writer.write_record(&header)?;

    for (row, y) in features.rows().into_iter().zip(target.iter()) {
        let fields = row
            .iter()
            .chain(std::iter::once(y))
            .map(f64::to_string);
        writer.write_record(fields)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a matrix written by [`write_matrix`].
pub fn read_matrix(path: &Path) -> HousingResult<FeatureMatrix> {
    if !path.is_file() {
        return Err(DataError::MissingFile(path.to_path_buf()).into());
    }
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let mut feature_names: Vec<String> = reader.headers()?.iter().map(ToString::to_string).collect();
    if feature_names.len() < 2 {
        return Err(DataError::SchemaMismatch {
            path: path.to_path_buf(),
            message: "expected at least one feature column and a target column".to_string(),
        }
        .into());
    }
    feature_names.pop();
    let width = feature_names.len();

    let mut features = Vec::new();
    let mut target = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let values = record
            .iter()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DataError::SchemaMismatch {
                path: path.to_path_buf(),
                message: format!("row {}: {e}", line + 1),
            })?;
        let (x, y) = values.split_at(width);
        features.extend_from_slice(x);
        target.push(y[0]);
    }
    if target.is_empty() {
        return Err(DataError::Empty(path.to_path_buf()).into());
    }

    let features = Array2::from_shape_vec((target.len(), width), features).map_err(|e| {
        DataError::SchemaMismatch {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    Ok(FeatureMatrix {
        feature_names,
        features,
        target: Array1::from(target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matrix_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transformed/train.csv");
        let names = vec!["a".to_string(), "b".to_string()];
        let x = array![[0.5, -1.25], [2.0, 3.0], [0.1, 0.2]];
        let y = array![10.0, 20.0, 30.0];

        write_matrix(&path, &names, "median_house_value", x.view(), y.view()).unwrap();
        let matrix = read_matrix(&path).unwrap();

        assert_eq!(matrix.feature_names, names);
        assert_eq!(matrix.features, x);
        assert_eq!(matrix.target, y);
    }

    #[test]
    fn test_non_numeric_cell_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "a,target\n1.0,oops\n").unwrap();
        assert!(read_matrix(&path).is_err());
    }
}
