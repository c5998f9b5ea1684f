//! Validator configuration.
//!
//! Holds the knobs of a [`FormValidator`](crate::FormValidator) run. Missing
//! keys fall back to their defaults, so an empty file is a valid config.
//!
//! # Example YAML
//!
//! ```yaml
//! max_recursion: 5
//! default_max_items: 100
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of subsection levels below a root section.
pub const DEFAULT_MAX_RECURSION: usize = 5;

/// Default item cap for elements that declare neither `minItems` nor `maxItems`.
pub const DEFAULT_MAX_ITEMS: usize = 100;

/// Settings for schema and data validation.
///
/// # Examples
///
/// ```
/// use form_schema_validation::ValidatorConfig;
///
/// let config: ValidatorConfig = serde_yaml::from_str("default_max_items: 10").unwrap();
/// assert_eq!(config.default_max_items, 10);
/// assert_eq!(config.max_recursion, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// How many subsection levels a root section may contain.
    pub max_recursion: usize,
    /// Item cap applied when an element declares no item bounds.
    pub default_max_items: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_recursion: DEFAULT_MAX_RECURSION,
            default_max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl ValidatorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or
    /// [`ConfigError::YamlError`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be written, or
    /// [`ConfigError::YamlError`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let yaml = "max_recursion: 2\ndefault_max_items: 7\n";
        let config: ValidatorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_recursion, 2);
        assert_eq!(config.default_max_items, 7);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: ValidatorConfig = serde_yaml::from_str("max_recursion: 1").unwrap();
        assert_eq!(config.max_recursion, 1);
        assert_eq!(config.default_max_items, DEFAULT_MAX_ITEMS);
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validator.yml");

        let original = ValidatorConfig {
            max_recursion: 3,
            default_max_items: 12,
        };
        original.save(&path).unwrap();

        let loaded = ValidatorConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ValidatorConfig::load(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
