//! Dataset retrieval.

use crate::errors::{HousingError, HousingResult};
use crate::utils::fs::ensure_parent;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Copies a dataset from a URL to a local file.
#[cfg_attr(test, mockall::automock)]
pub trait DatasetFetcher: Send + Sync {
    /// Fetches `url` into `destination`, returning the bytes written.
    fn fetch(&self, url: &str, destination: &Path) -> HousingResult<u64>;
}

/// Fetches `http(s)://` URLs over HTTP and `file://` URLs or bare paths
/// from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct UrlFetcher;

impl UrlFetcher {
    /// Creates a new fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn download(url: &str, destination: &Path) -> HousingResult<u64> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        let mut response = client.get(url).send()?;
        if !response.status().is_success() {
            return Err(HousingError::download(
                url,
                format!("server responded {}", response.status()),
            ));
        }

        let mut writer = BufWriter::new(File::create(destination)?);
        let written = response.copy_to(&mut writer)?;
        writer.flush()?;
        Ok(written)
    }
}

impl DatasetFetcher for UrlFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> HousingResult<u64> {
        ensure_parent(destination)?;
        info!(url, destination = %destination.display(), "Fetching dataset");

        if url.starts_with("http://") || url.starts_with("https://") {
            return Self::download(url, destination);
        }

        let source = local_path(url);
        fs::copy(&source, destination).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                HousingError::download(url, format!("'{}' does not exist", source.display()))
            }
            _ => e.into(),
        })
    }
}

/// File name to store a download under: the last URL path segment.
#[must_use]
pub fn file_name_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("housing.tgz")
        .to_string()
}

fn local_path(url: &str) -> PathBuf {
    PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
}
