//! Typed rows of the housing CSV.

use crate::errors::{DataError, HousingResult};
use crate::utils::fs::ensure_parent;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Numeric feature columns, in file order.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
];

/// The regression target.
pub const TARGET_COLUMN: &str = "median_house_value";

/// The single categorical feature.
pub const CATEGORICAL_COLUMN: &str = "ocean_proximity";

/// Every column of the dataset, in file order.
pub const COLUMNS: [&str; 10] = [
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
    "median_house_value",
    "ocean_proximity",
];

/// One row of the housing dataset.
///
/// Numeric fields are optional because the published dataset has gaps
/// (notably `total_bedrooms`); the preprocessor imputes them. Prediction
/// rows carry no target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct HousingRecord {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub housing_median_age: Option<f64>,
    pub total_rooms: Option<f64>,
    pub total_bedrooms: Option<f64>,
    pub population: Option<f64>,
    pub households: Option<f64>,
    pub median_income: Option<f64>,
    pub median_house_value: Option<f64>,
    pub ocean_proximity: String,
}

impl HousingRecord {
    /// Numeric feature values in [`NUMERIC_COLUMNS`] order.
    #[must_use]
    pub fn numeric_values(&self) -> [Option<f64>; 8] {
        [
            self.longitude,
            self.latitude,
            self.housing_median_age,
            self.total_rooms,
            self.total_bedrooms,
            self.population,
            self.households,
            self.median_income,
        ]
    }

    /// Value of a numeric column by name, `None` for unknown names or gaps.
    #[must_use]
    pub fn numeric(&self, column: &str) -> Option<f64> {
        if column == TARGET_COLUMN {
            return self.median_house_value;
        }
        NUMERIC_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.numeric_values()[i])
    }
}

/// Reads every row of a housing CSV.
///
/// Fails with [`DataError::MissingFile`] when the file is absent and
/// [`DataError::Empty`] when it has a header but no rows.
pub fn read_records(path: &Path) -> HousingResult<Vec<HousingRecord>> {
    if !path.is_file() {
        return Err(DataError::MissingFile(path.to_path_buf()).into());
    }
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(File::open(path)?));

    let records = reader
        .deserialize()
        .collect::<Result<Vec<HousingRecord>, _>>()?;
    if records.is_empty() {
        return Err(DataError::Empty(path.to_path_buf()).into());
    }
    Ok(records)
}

/// Reads only the header row of a CSV.
pub fn read_headers(path: &Path) -> HousingResult<Vec<String>> {
    if !path.is_file() {
        return Err(DataError::MissingFile(path.to_path_buf()).into());
    }
    let mut reader = ReaderBuilder::new().from_reader(BufReader::new(File::open(path)?));
    Ok(reader.headers()?.iter().map(|h| h.trim().to_string()).collect())
}

/// Writes rows as a housing CSV with a header, creating parent directories.
pub fn write_records(path: &Path, records: &[HousingRecord]) -> HousingResult<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HousingError;
    use std::fs;

    const CSV: &str = "\
longitude,latitude,housing_median_age,total_rooms,total_bedrooms,population,households,median_income,median_house_value,ocean_proximity
-122.23,37.88,41.0,880.0,129.0,322.0,126.0,8.3252,452600.0,NEAR BAY
-122.22,37.86,21.0,7099.0,,2401.0,1138.0,8.3014,358500.0,NEAR BAY
";

    #[test]
    fn test_read_records_with_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("housing.csv");
        fs::write(&path, CSV).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].median_income, Some(8.3252));
        assert_eq!(records[1].total_bedrooms, None);
        assert_eq!(records[1].ocean_proximity, "NEAR BAY");
        assert_eq!(records[0].numeric("median_house_value"), Some(452_600.0));
        assert_eq!(records[0].numeric("households"), Some(126.0));
    }

    #[test]
    fn test_header_matches_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("housing.csv");
        fs::write(&path, CSV).unwrap();

        assert_eq!(read_headers(&path).unwrap(), COLUMNS.to_vec());
    }

    #[test]
    fn test_written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let target = dir.path().join("out/train.csv");
        fs::write(&source, CSV).unwrap();

        let records = read_records(&source).unwrap();
        write_records(&target, &records).unwrap();
        assert_eq!(read_records(&target).unwrap(), records);
        assert_eq!(read_headers(&target).unwrap(), COLUMNS.to_vec());
    }

    #[test]
    fn test_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_records(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(missing, HousingError::Data(DataError::MissingFile(_))));

        let empty = dir.path().join("empty.csv");
        fs::write(&empty, CSV.lines().next().unwrap()).unwrap();
        let err = read_records(&empty).unwrap_err();
        assert!(matches!(err, HousingError::Data(DataError::Empty(_))));
    }
}
