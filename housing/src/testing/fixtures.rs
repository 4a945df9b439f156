//! Fixture documents and synthetic datasets.

use crate::config::constants::{CONFIG_DIR, CONFIG_FILE_NAME};
use crate::data::{write_records, HousingRecord};
use crate::errors::{HousingError, HousingResult};
use crate::utils::fs::ensure_parent;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Allowed `ocean_proximity` values, sorted.
pub const OCEAN_PROXIMITY: [&str; 5] = ["<1H OCEAN", "INLAND", "ISLAND", "NEAR BAY", "NEAR OCEAN"];

/// Price offset per `ocean_proximity` value.
const PROXIMITY_PREMIUM: [f64; 5] = [20_000.0, -40_000.0, 60_000.0, 30_000.0, 25_000.0];

/// One `median_income` band strictly inside each income stratum.
const INCOME_BANDS: [(f64, f64); 5] = [(0.5, 1.4), (1.6, 2.9), (3.1, 4.4), (4.6, 5.9), (6.1, 10.0)];

/// A complete configuration document whose dataset lives at `dataset_url`.
///
/// Every key is indented by two spaces and unique across the document.
#[must_use]
pub fn config_document_yaml(dataset_url: &str) -> String {
    format!(
        "\
training_pipeline_config:
  pipeline_name: housing
  artifact_dir: artifact
data_ingestion_config:
  dataset_download_url: '{dataset_url}'
  raw_data_dir: raw_data
  tgz_download_dir: tgz_data
  ingested_dir: ingested_data
  ingested_train_dir: train
  ingested_test_dir: test
data_validation_config:
  schema_dir: config
  schema_file_name: schema.yaml
  report_file_name: report.json
  report_page_file_name: report.html
data_transformation_config:
  add_bedroom_per_room: true
  transformed_dir: transformed_data
  transformed_train_dir: train
  transformed_test_dir: test
  preprocessing_dir: preprocessed
  preprocessed_object_file_name: preprocessed.json
model_trainer_config:
  trained_model_dir: trained_model
  model_file_name: model.json
  base_accuracy: 0.6
  model_config_dir: config
  model_config_file_name: model.yaml
model_evaluation_config:
  model_evaluation_file_name: model_evaluation.yaml
model_pusher_config:
  model_export_dir: saved_models
"
    )
}

/// The dataset schema document.
#[must_use]
pub fn schema_yaml() -> String {
    "\
columns:
  longitude: float
  latitude: float
  housing_median_age: float
  total_rooms: float
  total_bedrooms: float
  population: float
  households: float
  median_income: float
  median_house_value: float
  ocean_proximity: category
numerical_columns:
  - longitude
  - latitude
  - housing_median_age
  - total_rooms
  - total_bedrooms
  - population
  - households
  - median_income
categorical_columns:
  - ocean_proximity
target_column: median_house_value
domain_value:
  ocean_proximity:
    - '<1H OCEAN'
    - INLAND
    - ISLAND
    - NEAR BAY
    - NEAR OCEAN
"
    .to_string()
}

/// The model catalog document.
#[must_use]
pub fn model_yaml() -> String {
    "\
candidates:
  - name: ridge_light
    alpha: 0.1
  - name: ridge
    alpha: 1.0
  - name: ridge_heavy
    alpha: 10.0
"
    .to_string()
}

/// The `ocean_proximity` domain as owned strings.
#[must_use]
pub fn ocean_proximity_domain() -> Vec<String> {
    OCEAN_PROXIMITY.iter().map(|v| (*v).to_string()).collect()
}

/// The first row of the published dataset.
#[must_use]
pub fn sample_record() -> HousingRecord {
    HousingRecord {
        longitude: Some(-122.23),
        latitude: Some(37.88),
        housing_median_age: Some(41.0),
        total_rooms: Some(880.0),
        total_bedrooms: Some(129.0),
        population: Some(322.0),
        households: Some(126.0),
        median_income: Some(8.3252),
        median_house_value: Some(452_600.0),
        ocean_proximity: "NEAR BAY".to_string(),
    }
}

/// Generates `n` plausible rows whose target is close to linear in the
/// features.
///
/// Rows cycle through the five income strata, so any `n >= 5` covers all
/// of them. Every 23rd row has no `total_bedrooms`. The same seed always
/// yields the same rows.
#[must_use]
pub fn synthetic_records(n: usize, seed: u64) -> Vec<HousingRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let (low, high) = INCOME_BANDS[i % INCOME_BANDS.len()];
            let median_income: f64 = rng.gen_range(low..high);
            let households: f64 = rng.gen_range(50.0_f64..1500.0).round();
            let total_rooms = (households * rng.gen_range(3.0..7.0)).round();
            let total_bedrooms = (total_rooms * rng.gen_range(0.15..0.3)).round();
            let population = (households * rng.gen_range(2.0..4.0)).round();
            let housing_median_age = rng.gen_range(1.0_f64..52.0).round();
            let proximity = rng.gen_range(0..OCEAN_PROXIMITY.len());
            let noise: f64 = rng.gen_range(-15_000.0..15_000.0);

            let value = 60_000.0
                + 40_000.0 * median_income
                + 1_000.0 * housing_median_age
                + PROXIMITY_PREMIUM[proximity]
                + noise;

            HousingRecord {
                longitude: Some(rng.gen_range(-124.0..-114.5)),
                latitude: Some(rng.gen_range(32.5..42.0)),
                housing_median_age: Some(housing_median_age),
                total_rooms: Some(total_rooms),
                total_bedrooms: (i % 23 != 22).then_some(total_bedrooms),
                population: Some(population),
                households: Some(households),
                median_income: Some(median_income),
                median_house_value: Some(value.round()),
                ocean_proximity: OCEAN_PROXIMITY[proximity].to_string(),
            }
        })
        .collect()
}

/// Writes rows as a dataset CSV.
pub fn write_housing_csv(path: &Path, records: &[HousingRecord]) -> HousingResult<()> {
    write_records(path, records)
}

/// Writes rows as a gzipped tarball holding a single `housing.csv`.
pub fn write_dataset_tgz(path: &Path, records: &[HousingRecord]) -> HousingResult<()> {
    let mut csv = csv::Writer::from_writer(Vec::new());
    for record in records {
        csv.serialize(record)?;
    }
    let bytes = csv
        .into_inner()
        .map_err(|err| HousingError::Io(err.into_error()))?;

    ensure_parent(path)?;
    let encoder = GzEncoder::new(File::create(path)?, Compression::default());
    let mut archive = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    archive.append_data(&mut header, "housing.csv", bytes.as_slice())?;
    archive.into_inner()?.finish()?;
    Ok(())
}

/// Writes a project tree under `root`: the configuration document pointing
/// at `dataset_url`, the schema and the model catalog.
///
/// Returns the configuration file path.
pub fn write_project(root: &Path, dataset_url: &str) -> HousingResult<PathBuf> {
    let config_dir = root.join(CONFIG_DIR);
    fs::create_dir_all(&config_dir)?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    fs::write(&config_path, config_document_yaml(dataset_url))?;
    fs::write(config_dir.join("schema.yaml"), schema_yaml())?;
    fs::write(config_dir.join("model.yaml"), model_yaml())?;
    Ok(config_path)
}
