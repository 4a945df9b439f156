//! Dataset download, extraction and stratified split.

use super::fetcher::{file_name_from_url, DatasetFetcher};
use super::Stage;
use crate::config::DataIngestionConfig;
use crate::core::{DataIngestionArtifact, StageName};
use crate::data::{read_records, stratified_split, write_records, SPLIT_SEED, TEST_RATIO};
use crate::errors::{DataError, HousingError, HousingResult};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tar::Archive;
use tracing::info;

/// Fetches the dataset archive, unpacks it and writes train/test splits.
pub struct DataIngestion {
    config: DataIngestionConfig,
    fetcher: Arc<dyn DatasetFetcher>,
}

impl std::fmt::Debug for DataIngestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataIngestion")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DataIngestion {
    /// Creates the stage.
    #[must_use]
    pub fn new(config: DataIngestionConfig, fetcher: Arc<dyn DatasetFetcher>) -> Self {
        Self { config, fetcher }
    }

    fn download(&self) -> HousingResult<PathBuf> {
        let url = &self.config.dataset_download_url;
        let destination = self
            .config
            .tgz_download_dir
            .join(file_name_from_url(url));
        let bytes = self.fetcher.fetch(url, &destination)?;
        info!(url = %url, bytes, file = %destination.display(), "Dataset downloaded");
        Ok(destination)
    }

    /// Unpacks or copies the download into the raw data dir and returns the
    /// CSV found there.
    fn extract(&self, download: &Path) -> HousingResult<PathBuf> {
        let raw_dir = &self.config.raw_data_dir;
        if raw_dir.exists() {
            fs::remove_dir_all(raw_dir)?;
        }
        fs::create_dir_all(raw_dir)?;

        let name = download
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with(".tgz") || name.ends_with(".tar.gz") {
            let mut archive = Archive::new(GzDecoder::new(File::open(download)?));
            archive.unpack(raw_dir)?;
        } else if name.ends_with(".csv") {
            fs::copy(download, raw_dir.join(&name))?;
        } else {
            return Err(HousingError::download(
                &self.config.dataset_download_url,
                "expected a .tgz, .tar.gz or .csv file",
            ));
        }

        let csv = first_csv(raw_dir)?;
        info!(file = %csv.display(), "Dataset extracted");
        Ok(csv)
    }

    fn split(&self, csv: &Path) -> HousingResult<DataIngestionArtifact> {
        let records = read_records(csv)?;
        let (train, test) = stratified_split(&records, TEST_RATIO, SPLIT_SEED);

        let file_name = csv
            .file_name()
            .map_or_else(|| "housing.csv".into(), std::ffi::OsStr::to_os_string);
        let train_file_path = self.config.ingested_train_dir.join(&file_name);
        let test_file_path = self.config.ingested_test_dir.join(&file_name);
        write_records(&train_file_path, &train)?;
        write_records(&test_file_path, &test)?;

        info!(
            rows = records.len(),
            train_rows = train.len(),
            test_rows = test.len(),
            "Dataset split"
        );
        Ok(DataIngestionArtifact {
            train_file_path,
            test_file_path,
            is_ingested: true,
            message: format!(
                "Data ingestion completed: {} train rows, {} test rows",
                train.len(),
                test.len()
            ),
        })
    }
}

impl Stage for DataIngestion {
    type Input = ();
    type Output = DataIngestionArtifact;

    fn name(&self) -> &str {
        StageName::DataIngestion.as_str()
    }

    fn run(&self, (): ()) -> HousingResult<DataIngestionArtifact> {
        let download = self.download()?;
        let csv = self.extract(&download)?;
        self.split(&csv)
    }
}

fn first_csv(dir: &Path) -> HousingResult<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| DataError::NoCsv(dir.to_path_buf()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{income_category, read_records};
    use crate::stages::MockDatasetFetcher;
    use crate::testing::fixtures::{synthetic_records, write_dataset_tgz, write_housing_csv};
    use mockall::predicate::eq;

    fn config(root: &Path, url: &str) -> DataIngestionConfig {
        let stage = root.join("data_ingestion/20240101000000");
        DataIngestionConfig {
            dataset_download_url: url.to_string(),
            tgz_download_dir: stage.join("tgz_data"),
            raw_data_dir: stage.join("raw_data"),
            ingested_train_dir: stage.join("ingested_data/train"),
            ingested_test_dir: stage.join("ingested_data/test"),
        }
    }

    #[test]
    fn test_ingests_tgz_through_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("source/housing.tgz");
        let records = synthetic_records(100, 8);
        write_dataset_tgz(&archive, &records).unwrap();

        let config = config(dir.path(), "http://example/housing.tgz");
        let expected_destination = config.tgz_download_dir.join("housing.tgz");
        let mut fetcher = MockDatasetFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq("http://example/housing.tgz"), eq(expected_destination))
            .times(1)
            .returning(move |_, destination| {
                fs::create_dir_all(destination.parent().unwrap()).unwrap();
                Ok(fs::copy(&archive, destination).unwrap())
            });

        let stage = DataIngestion::new(config.clone(), Arc::new(fetcher));
        let artifact = stage.run(()).unwrap();

        assert!(artifact.is_ingested);
        assert_eq!(artifact.train_file_path, config.ingested_train_dir.join("housing.csv"));
        assert_eq!(artifact.test_file_path, config.ingested_test_dir.join("housing.csv"));

        let train = read_records(&artifact.train_file_path).unwrap();
        let test = read_records(&artifact.test_file_path).unwrap();
        assert_eq!(train.len() + test.len(), 100);
        assert!(test.len() >= 18 && test.len() <= 22);
        assert!(test.iter().any(|r| income_category(r.median_income) == 5));
    }

    #[test]
    fn test_ingests_plain_csv_from_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source/housing.csv");
        write_housing_csv(&source, &synthetic_records(40, 2)).unwrap();

        let stage = DataIngestion::new(
            config(dir.path(), source.to_str().unwrap()),
            Arc::new(crate::stages::UrlFetcher::new()),
        );
        let artifact = stage.run(()).unwrap();
        assert!(artifact.train_file_path.exists());
        assert!(artifact.test_file_path.exists());
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = MockDatasetFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|url, _| Err(HousingError::download(url, "connection refused")));

        let stage = DataIngestion::new(config(dir.path(), "http://example/data.tgz"), Arc::new(fetcher));
        assert!(matches!(stage.run(()), Err(HousingError::Download { .. })));
    }

    #[test]
    fn test_archive_without_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = MockDatasetFetcher::new();
        fetcher.expect_fetch().returning(|_, destination| {
            fs::create_dir_all(destination.parent().unwrap()).unwrap();
            let encoder = flate2::write::GzEncoder::new(
                File::create(destination).unwrap(),
                flate2::Compression::default(),
            );
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(5);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, "notes.txt", &b"hello"[..]).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
            Ok(0)
        });

        let stage = DataIngestion::new(config(dir.path(), "http://example/data.tgz"), Arc::new(fetcher));
        assert!(matches!(
            stage.run(()),
            Err(HousingError::Data(DataError::NoCsv(_)))
        ));
    }
}
