//! Error types for loading and serializing documents
//!
//! Provides error handling for:
//! - Load operations (bytes / files → Document)
//! - Serialize operations (Document → text)

use std::path::PathBuf;

use resdoc_document::DocumentError;

/// Errors while loading documents (ingress)
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No parser registered for file extension
    #[error("no parser registered for extension: '{0}'")]
    NoParserForExtension(String),

    /// Syntax error in source
    #[error("syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    /// IO error while reading
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit
    #[error("file too large: {path} is {size} bytes (max: {max})")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    /// Decoded value is not a valid document or resource
    #[error("invalid document in {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
}

impl LoadError {
    /// Create syntax error for path
    pub fn syntax(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create document error for path
    pub fn document(path: impl Into<PathBuf>, source: DocumentError) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }
}

/// Errors while serializing documents (egress)
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON encoding failed
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding failed
    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result alias for load operations
pub type LoadResult<T> = Result<T, LoadError>;
