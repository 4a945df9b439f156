//! One prediction request row.

use crate::data::{HousingRecord, CATEGORICAL_COLUMN, NUMERIC_COLUMNS};
use crate::errors::PredictionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Input fields of a prediction request, in the order the model expects.
pub const INPUT_COLUMNS: [&str; 9] = [
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
    "ocean_proximity",
];

/// A validated feature row: eight numeric values and the proximity category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct HousingData {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: f64,
    pub total_rooms: f64,
    pub total_bedrooms: f64,
    pub population: f64,
    pub households: f64,
    pub median_income: f64,
    pub ocean_proximity: String,
}

impl HousingData {
    /// Builds a row from numeric values in [`NUMERIC_COLUMNS`] order.
    ///
    /// Every value must be finite and the category must not be blank.
    pub fn new(
        numeric: [f64; 8],
        ocean_proximity: impl Into<String>,
    ) -> Result<Self, PredictionError> {
        if let Some(i) = numeric.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::invalid_input(format!(
                "'{}' must be a finite number",
                NUMERIC_COLUMNS[i]
            )));
        }
        let ocean_proximity = ocean_proximity.into().trim().to_string();
        if ocean_proximity.is_empty() {
            return Err(PredictionError::invalid_input(format!(
                "'{CATEGORICAL_COLUMN}' is required"
            )));
        }

        let [longitude, latitude, housing_median_age, total_rooms, total_bedrooms, population, households, median_income] =
            numeric;
        Ok(Self {
            longitude,
            latitude,
            housing_median_age,
            total_rooms,
            total_bedrooms,
            population,
            households,
            median_income,
            ocean_proximity,
        })
    }

    /// Parses a submitted form keyed by [`INPUT_COLUMNS`].
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, PredictionError> {
        let mut numeric = [0.0; 8];
        for (value, name) in numeric.iter_mut().zip(NUMERIC_COLUMNS) {
            let raw = form_field(form, name)?;
            *value = raw.parse().map_err(|_| {
                PredictionError::invalid_input(format!("'{name}' is not a number: '{raw}'"))
            })?;
        }
        Self::new(numeric, form_field(form, CATEGORICAL_COLUMN)?)
    }

    /// Numeric values in [`NUMERIC_COLUMNS`] order.
    #[must_use]
    pub fn numeric_values(&self) -> [f64; 8] {
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

    /// Field names and display values in [`INPUT_COLUMNS`] order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        NUMERIC_COLUMNS
            .iter()
            .zip(self.numeric_values())
            .map(|(name, value)| (*name, value.to_string()))
            .chain(std::iter::once((CATEGORICAL_COLUMN, self.ocean_proximity.clone())))
            .collect()
    }

    /// Shapes the row as a dataset record without a target.
    #[must_use]
    pub fn to_record(&self) -> HousingRecord {
        HousingRecord {
            longitude: Some(self.longitude),
            latitude: Some(self.latitude),
            housing_median_age: Some(self.housing_median_age),
            total_rooms: Some(self.total_rooms),
            total_bedrooms: Some(self.total_bedrooms),
            population: Some(self.population),
            households: Some(self.households),
            median_income: Some(self.median_income),
            median_house_value: None,
            ocean_proximity: self.ocean_proximity.clone(),
        }
    }
}

fn form_field<'a>(form: &'a HashMap<String, String>, name: &str) -> Result<&'a str, PredictionError> {
    form.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PredictionError::invalid_input(format!("'{name}' is required")))
}
