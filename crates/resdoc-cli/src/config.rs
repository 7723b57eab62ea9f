//! CLI configuration
//!
//! Values come from defaults, then an optional TOML file, then command line
//! flags, each layer overriding the previous one.

use std::fs;
use std::path::{Path, PathBuf};

use resdoc_document::DEFAULT_CONFIG_ANNOTATION;
use resdoc_loader::{Format, LoaderConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ResdocConfig`]
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Values parsed but are unusable
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Runtime settings for the `resdoc` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResdocConfig {
    /// Annotation holding the last-applied snapshot
    pub annotation: String,
    /// Output format for printed documents
    pub output: Format,
    /// Maximum file size to load (bytes)
    pub max_file_size: u64,
}

impl Default for ResdocConfig {
    fn default() -> Self {
        Self {
            annotation: DEFAULT_CONFIG_ANNOTATION.to_string(),
            output: Format::default(),
            max_file_size: LoaderConfig::default().max_file_size,
        }
    }
}

impl ResdocConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML config file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid configuration
    /// - `ConfigError::Invalid` if a value is out of range
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// With annotation key
    #[inline]
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>) -> Self {
        self.annotation = key.into();
        self
    }

    /// With output format
    #[inline]
    #[must_use]
    pub fn with_output(mut self, output: Format) -> Self {
        self.output = output;
        self
    }

    /// With maximum file size
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for an empty annotation key or a zero
    /// size limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.annotation.is_empty() {
            return Err(ConfigError::Invalid("annotation must not be empty".into()));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid("max_file_size must be positive".into()));
        }
        Ok(())
    }

    /// Loader limits derived from this configuration
    #[must_use]
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::new().with_max_file_size(self.max_file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResdocConfig::default();
        assert_eq!(config.annotation, DEFAULT_CONFIG_ANNOTATION);
        assert_eq!(config.output, Format::Json);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ResdocConfig = toml::from_str("output = \"yaml\"").unwrap();
        assert_eq!(config.output, Format::Yaml);
        assert_eq!(config.annotation, DEFAULT_CONFIG_ANNOTATION);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(toml::from_str::<ResdocConfig>("colour = true").is_err());
    }

    #[test]
    fn builders_override() {
        let config = ResdocConfig::new()
            .with_annotation("example.com/applied")
            .with_output(Format::Yaml)
            .with_max_file_size(64);
        assert_eq!(config.annotation, "example.com/applied");
        assert_eq!(config.loader_config().max_file_size, 64);
    }

    #[test]
    fn validation() {
        let empty = ResdocConfig::new().with_annotation("");
        assert!(matches!(empty.validate(), Err(ConfigError::Invalid(_))));
        let zero = ResdocConfig::new().with_max_file_size(0);
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resdoc.toml");
        fs::write(&path, "annotation = \"example.com/applied\"\nmax_file_size = 1024\n").unwrap();

        let config = ResdocConfig::load(&path).unwrap();
        assert_eq!(config.annotation, "example.com/applied");
        assert_eq!(config.max_file_size, 1024);
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ResdocConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let path = dir.path().join("bad.toml");
        fs::write(&path, "max_file_size = \"big\"").unwrap();
        assert!(matches!(ResdocConfig::load(&path), Err(ConfigError::Parse { .. })));

        fs::write(&path, "max_file_size = 0").unwrap();
        assert!(matches!(ResdocConfig::load(&path), Err(ConfigError::Invalid(_))));
    }
}
