//! The fitted feature preprocessor.
//!
//! Column layout of a transformed row:
//! 1. the eight numeric columns, median-imputed
//! 2. derived ratios (`rooms_per_household`, `population_per_household` and,
//!    when enabled, `bedrooms_per_room`)
//! 3. one indicator per `ocean_proximity` category
//!
//! Groups 1 and 2 are standard-scaled with statistics from the fitting rows.

use super::error::ModelError;
use crate::data::{HousingRecord, CATEGORICAL_COLUMN, NUMERIC_COLUMNS, TARGET_COLUMN};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names of the derived ratio columns, in output order.
pub const DERIVED_COLUMNS: [&str; 3] = [
    "rooms_per_household",
    "population_per_household",
    "bedrooms_per_room",
];

const TOTAL_ROOMS: usize = 3;
const TOTAL_BEDROOMS: usize = 4;
const POPULATION: usize = 5;
const HOUSEHOLDS: usize = 6;

/// Imputation, derived features, scaling and one-hot encoding, fitted once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    add_bedroom_per_room: bool,
    /// Median of each numeric column over the fitting rows.
    medians: Vec<f64>,
    /// Per scaled column mean.
    means: Vec<f64>,
    /// Per scaled column standard deviation; 1 for constant columns.
    stds: Vec<f64>,
    /// One-hot categories, in output order.
    categories: Vec<String>,
    /// Fill value for empty categorical fields.
    most_frequent_category: String,
}

impl Preprocessor {
    /// Fits the preprocessor on training rows.
    ///
    /// `categories` fixes the one-hot vocabulary (normally the schema
    /// domain); when empty, the distinct values of the fitting rows are used
    /// in sorted order.
    pub fn fit(
        records: &[HousingRecord],
        add_bedroom_per_room: bool,
        categories: &[String],
    ) -> Result<Self, ModelError> {
        if records.is_empty() {
            return Err(ModelError::EmptyData(
                "cannot fit preprocessor on zero rows".to_string(),
            ));
        }

        let medians = NUMERIC_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, _)| median(records.iter().filter_map(|r| r.numeric_values()[i])))
            .collect::<Vec<_>>();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            let value = record.ocean_proximity.trim();
            if !value.is_empty() {
                *counts.entry(value).or_insert(0) += 1;
            }
        }
        let most_frequent_category = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(value, _)| (*value).to_string())
            .ok_or_else(|| {
                ModelError::EmptyData(format!("every '{CATEGORICAL_COLUMN}' value is empty"))
            })?;
        let categories = if categories.is_empty() {
            counts.keys().map(|c| (*c).to_string()).collect()
        } else {
            categories.to_vec()
        };

        let mut fitted = Self {
            add_bedroom_per_room,
            medians,
            means: Vec::new(),
            stds: Vec::new(),
            categories,
            most_frequent_category,
        };

        let raw = records
            .iter()
            .map(|r| fitted.unscaled(r))
            .collect::<Result<Vec<_>, _>>()?;
        let width = fitted.n_scaled();
        let n = raw.len() as f64;
        fitted.means = (0..width)
            .map(|j| raw.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        fitted.stds = (0..width)
            .map(|j| {
                let mean = fitted.means[j];
                let var = raw.iter().map(|row| (row[j] - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std > 0.0 { std } else { 1.0 }
            })
            .collect();

        Ok(fitted)
    }

    /// Names of the output columns, in order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        NUMERIC_COLUMNS
            .iter()
            .chain(DERIVED_COLUMNS.iter().take(self.n_derived()))
            .map(|c| (*c).to_string())
            .chain(
                self.categories
                    .iter()
                    .map(|c| format!("{CATEGORICAL_COLUMN}_{c}")),
            )
            .collect()
    }

    /// Width of a transformed row.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_scaled() + self.categories.len()
    }

    /// The one-hot vocabulary.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Transforms one row.
    pub fn transform_record(&self, record: &HousingRecord) -> Result<Vec<f64>, ModelError> {
        let mut row = self.unscaled(record)?;
        let names = NUMERIC_COLUMNS.iter().chain(DERIVED_COLUMNS.iter());
        for ((j, value), name) in row.iter_mut().enumerate().zip(names) {
            *value = (*value - self.means[j]) / self.stds[j];
            // Extreme but finite inputs can still overflow once scaled.
            if !value.is_finite() {
                return Err(ModelError::NonFiniteFeature {
                    feature: (*name).to_string(),
                });
            }
        }

        let category = match record.ocean_proximity.trim() {
            "" => self.most_frequent_category.as_str(),
            value => value,
        };
        let hot = self
            .categories
            .iter()
            .position(|c| c == category)
            .ok_or_else(|| ModelError::UnknownCategory {
                column: CATEGORICAL_COLUMN.to_string(),
                value: category.to_string(),
            })?;
        row.extend((0..self.categories.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
        Ok(row)
    }

    /// Transforms rows into a feature matrix.
    pub fn transform(&self, records: &[HousingRecord]) -> Result<Array2<f64>, ModelError> {
        let width = self.n_features();
        let mut data = Vec::with_capacity(records.len() * width);
        for record in records {
            data.extend(self.transform_record(record)?);
        }
        Array2::from_shape_vec((records.len(), width), data)
            .map_err(|e| ModelError::InvalidParameter(e.to_string()))
    }

    fn n_derived(&self) -> usize {
        if self.add_bedroom_per_room { 3 } else { 2 }
    }

    fn n_scaled(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.n_derived()
    }

    /// Imputed numerics followed by derived ratios, before scaling.
    fn unscaled(&self, record: &HousingRecord) -> Result<Vec<f64>, ModelError> {
        let mut row: Vec<f64> = record
            .numeric_values()
            .iter()
            .zip(&self.medians)
            .map(|(value, median)| value.unwrap_or(*median))
            .collect();
        for (value, name) in row.iter().zip(NUMERIC_COLUMNS) {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteFeature {
                    feature: name.to_string(),
                });
            }
        }

        let derived = [
            row[TOTAL_ROOMS] / row[HOUSEHOLDS],
            row[POPULATION] / row[HOUSEHOLDS],
            row[TOTAL_BEDROOMS] / row[TOTAL_ROOMS],
        ];
        for (value, name) in derived.iter().zip(DERIVED_COLUMNS).take(self.n_derived()) {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteFeature {
                    feature: name.to_string(),
                });
            }
            row.push(*value);
        }
        Ok(row)
    }
}

/// Extracts the target column, failing on gaps.
pub fn targets(records: &[HousingRecord]) -> Result<Array1<f64>, ModelError> {
    records
        .iter()
        .map(|r| {
            r.median_house_value
                .filter(|v| v.is_finite())
                .ok_or_else(|| ModelError::NonFiniteFeature {
                    feature: TARGET_COLUMN.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Array1::from)
}

fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{ocean_proximity_domain, sample_record, synthetic_records};

    #[test]
    fn test_median() {
        assert_eq!(median([3.0, 1.0, 2.0].into_iter()), 2.0);
        assert_eq!(median([4.0, 1.0, 2.0, 3.0].into_iter()), 2.5);
        assert_eq!(median(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_layout_with_and_without_bedrooms_ratio() {
        let records = synthetic_records(50, 1);
        let domain = ocean_proximity_domain();

        let with = Preprocessor::fit(&records, true, &domain).unwrap();
        assert_eq!(with.n_features(), 8 + 3 + 5);
        assert_eq!(with.feature_names()[10], "bedrooms_per_room");
        assert_eq!(with.feature_names()[11], "ocean_proximity_<1H OCEAN");

        let without = Preprocessor::fit(&records, false, &domain).unwrap();
        assert_eq!(without.n_features(), 8 + 2 + 5);
        assert!(!without.feature_names().contains(&"bedrooms_per_room".to_string()));
    }

    #[test]
    fn test_scaled_columns_are_standardized() {
        let records = synthetic_records(200, 5);
        let pre = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();
        let matrix = pre.transform(&records).unwrap();

        for j in 0..11 {
            let column = matrix.column(j);
            let mean = column.mean().unwrap();
            let var = column.mapv(|v| (v - mean).powi(2)).mean().unwrap();
            assert!(mean.abs() < 1e-9, "column {j} mean {mean}");
            assert!((var - 1.0).abs() < 1e-9, "column {j} var {var}");
        }
    }

    #[test]
    fn test_missing_values_are_imputed() {
        let records = synthetic_records(20, 9);
        let pre = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();

        let mut row = sample_record();
        row.total_bedrooms = None;
        row.ocean_proximity = String::new();
        let transformed = pre.transform_record(&row).unwrap();
        assert_eq!(transformed.len(), pre.n_features());
        assert!(transformed.iter().all(|v| v.is_finite()));
        assert_eq!(transformed[11..].iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let records = synthetic_records(30, 2);
        let pre = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();
        let row = sample_record();
        assert_eq!(pre.transform_record(&row).unwrap(), pre.transform_record(&row).unwrap());
    }

    #[test]
    fn test_rejects_unknown_category_and_zero_households() {
        let records = synthetic_records(20, 4);
        let pre = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();

        let mut row = sample_record();
        row.ocean_proximity = "MOON".to_string();
        assert!(matches!(
            pre.transform_record(&row),
            Err(ModelError::UnknownCategory { .. })
        ));

        let mut row = sample_record();
        row.households = Some(0.0);
        assert!(matches!(
            pre.transform_record(&row),
            Err(ModelError::NonFiniteFeature { ref feature }) if feature == "rooms_per_household"
        ));
    }

    #[test]
    fn test_rejects_overflow_after_scaling() {
        let records = synthetic_records(20, 4);
        let mut pre = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();
        pre.stds[0] = 0.5;

        let mut row = sample_record();
        row.longitude = Some(f64::MAX);
        assert!(matches!(
            pre.transform_record(&row),
            Err(ModelError::NonFiniteFeature { ref feature }) if feature == "longitude"
        ));
    }

    #[test]
    fn test_targets_require_values() {
        let mut records = synthetic_records(3, 1);
        assert_eq!(targets(&records).unwrap().len(), 3);
        records[1].median_house_value = None;
        assert!(targets(&records).is_err());
    }
}
