//! The parsed configuration document and typed key lookups.

use crate::errors::ConfigError;
use crate::utils::read_yaml_file;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// An immutable, parsed configuration document.
///
/// Top-level keys are section names; each section is a flat mapping of
/// directory names, file names and scalar parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Mapping,
}

impl ConfigDocument {
    /// Loads a document from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let value: Value = read_yaml_file(path)?;
        Self::from_value(value).map_err(|_| ConfigError::invalid_value(
            path.display().to_string(),
            "<root>",
            "a mapping of sections",
        ))
    }

    /// Parses a document from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            _ => Err(ConfigError::invalid_value("<inline>", "<root>", "a mapping of sections")),
        }
    }

    /// Returns a required section.
    pub fn section(&self, name: &str) -> Result<Section<'_>, ConfigError> {
        self.optional_section(name)?
            .ok_or_else(|| ConfigError::missing_key(name, name))
    }

    /// Returns a section if the document defines it.
    pub fn optional_section(&self, name: &str) -> Result<Option<Section<'_>>, ConfigError> {
        match self.root.get(name) {
            None => Ok(None),
            // A section header with no keys under it is present but empty.
            Some(Value::Null) => Ok(Some(Section { name: name.to_string(), entries: None })),
            Some(Value::Mapping(entries)) => Ok(Some(Section {
                name: name.to_string(),
                entries: Some(entries),
            })),
            Some(_) => Err(ConfigError::invalid_value(name, name, "a mapping")),
        }
    }
}

/// A borrowed view of one section of the document.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    name: String,
    entries: Option<&'a Mapping>,
}

impl Section<'_> {
    /// Returns the section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn value(&self, key: &str) -> Result<&Value, ConfigError> {
        match self.entries.and_then(|entries| entries.get(key)) {
            None | Some(Value::Null) => Err(ConfigError::missing_key(&self.name, key)),
            Some(value) => Ok(value),
        }
    }

    /// Returns a required string value.
    pub fn string(&self, key: &str) -> Result<String, ConfigError> {
        match self.value(key)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(ConfigError::invalid_value(&self.name, key, "a string")),
        }
    }

    /// Returns a required boolean value.
    pub fn bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.value(key)?
            .as_bool()
            .ok_or_else(|| ConfigError::invalid_value(&self.name, key, "a boolean"))
    }

    /// Returns a required numeric value.
    pub fn f64(&self, key: &str) -> Result<f64, ConfigError> {
        self.value(key)?
            .as_f64()
            .ok_or_else(|| ConfigError::invalid_value(&self.name, key, "a number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r"
training_pipeline_config:
  pipeline_name: housing
  artifact_dir: artifact
model_trainer_config:
  base_accuracy: 0.6
  model_file_name: model.json
data_transformation_config:
  add_bedroom_per_room: true
";

    #[test]
    fn test_typed_lookups() {
        let doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        let trainer = doc.section("model_trainer_config").unwrap();

        assert_eq!(trainer.f64("base_accuracy").unwrap(), 0.6);
        assert_eq!(trainer.string("model_file_name").unwrap(), "model.json");
        assert!(doc
            .section("data_transformation_config")
            .unwrap()
            .bool("add_bedroom_per_room")
            .unwrap());
    }

    #[test]
    fn test_missing_section_and_key() {
        let doc = ConfigDocument::from_yaml_str(DOC).unwrap();

        assert!(matches!(
            doc.section("data_ingestion_config"),
            Err(ConfigError::MissingKey { .. })
        ));
        let err = doc
            .section("training_pipeline_config")
            .unwrap()
            .string("missing")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { ref key, .. } if key == "missing"));
    }

    #[test]
    fn test_wrong_type_is_invalid_value() {
        let doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        let err = doc
            .section("data_transformation_config")
            .unwrap()
            .f64("add_bedroom_per_room")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_optional_section() {
        let doc = ConfigDocument::from_yaml_str(DOC).unwrap();
        assert!(doc.optional_section("model_pusher_config").unwrap().is_none());
        assert!(doc.optional_section("model_trainer_config").unwrap().is_some());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = ConfigDocument::from_yaml_str("key: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
