//! Document serialization (egress)
//!
//! Output keeps mapping keys in insertion order. This is not the canonical
//! form used for fingerprints.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use resdoc_document::Document;
use serde::{Deserialize, Serialize};

use crate::error::SerializeError;

/// Compact JSON
///
/// # Errors
/// Returns [`SerializeError::Json`] if encoding fails
pub fn to_json(doc: &Document) -> Result<String, SerializeError> {
    Ok(serde_json::to_string(doc)?)
}

/// Indented JSON
///
/// # Errors
/// Returns [`SerializeError::Json`] if encoding fails
pub fn to_json_pretty(doc: &Document) -> Result<String, SerializeError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Single YAML document
///
/// # Errors
/// Returns [`SerializeError::Yaml`] if encoding fails
pub fn to_yaml(doc: &Document) -> Result<String, SerializeError> {
    Ok(serde_yaml::to_string(doc)?)
}

/// YAML stream, each document introduced by `---`
///
/// # Errors
/// Returns [`SerializeError::Yaml`] if encoding fails
pub fn to_yaml_stream<'a, I>(docs: I) -> Result<String, SerializeError>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut out = String::new();
    for doc in docs {
        out.push_str("---\n");
        out.push_str(&to_yaml(doc)?);
    }
    Ok(out)
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Pretty JSON; several documents become an array
    #[default]
    Json,
    /// YAML; several documents become a stream
    Yaml,
}

impl Format {
    /// Render one document
    ///
    /// # Errors
    /// Returns the encoder's error
    pub fn render(self, doc: &Document) -> Result<String, SerializeError> {
        match self {
            Self::Json => to_json_pretty(doc),
            Self::Yaml => to_yaml(doc),
        }
    }

    /// Render several documents
    ///
    /// # Errors
    /// Returns the encoder's error
    pub fn render_all(self, docs: &[Document]) -> Result<String, SerializeError> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(docs)?),
            Self::Yaml => to_yaml_stream(docs),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{other}' (expected json or yaml)")),
        }
    }
}
