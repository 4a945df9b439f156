//! Filesystem helpers shared by the stages.

use crate::errors::{ConfigError, HousingResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Reads and deserializes a YAML file.
///
/// Read and parse failures are reported as configuration errors naming the
/// file, since every YAML document the pipeline reads is configuration.
pub fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes a value as YAML, creating parent directories as needed.
pub fn write_yaml_file<T: Serialize>(path: &Path, value: &T) -> HousingResult<()> {
    ensure_parent(path)?;
    let content = serde_yaml::to_string(value)?;
    fs::write(path, content)?;
    Ok(())
}

/// Serializes a value as pretty JSON, creating parent directories as needed.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> HousingResult<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Reads and deserializes a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> HousingResult<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Creates the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Computes the hex-encoded SHA-256 digest of a file.
pub fn file_sha256(path: &Path) -> io::Result<String> {
    let mut file = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        threshold: f64,
    }

    #[test]
    fn test_yaml_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/doc.yaml");
        let doc = Doc {
            name: "housing".to_string(),
            threshold: 0.6,
        };

        write_yaml_file(&path, &doc).unwrap();
        let loaded: Doc = read_yaml_file(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_read_yaml_missing_file_is_config_error() {
        let err = read_yaml_file::<Doc>(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_file_sha256_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        fs::write(&path, b"abc").unwrap();

        assert_eq!(
            file_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
