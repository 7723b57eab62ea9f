//! Document parsers for different file formats
//!
//! Provides parsing from text into [`Document`]s:
//! - JSON (one or more concatenated values) via `serde_json`
//! - YAML (multi-document streams) via `serde_yaml`

use std::fmt;
use std::path::Path;

use resdoc_document::Document;

use crate::error::LoadResult;

mod json;
mod yaml;

pub use json::JsonParser;
pub use yaml::YamlParser;

/// Parser trait for converting text into documents
///
/// Implement this trait to add support for new file formats.
pub trait DocumentParser: Send + Sync + 'static {
    /// Parse every document in `source`
    ///
    /// `origin` is only used in error messages.
    ///
    /// # Errors
    /// Returns [`crate::LoadError::Syntax`] for malformed input and
    /// [`crate::LoadError::Document`] for values that are not documents.
    fn parse(&self, source: &str, origin: &Path) -> LoadResult<Vec<Document>>;

    /// Check if this parser can handle the given path
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];
}

/// Parsers looked up by file extension
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        default_parsers()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parser_count", &self.parsers.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl ParserRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Register a parser; later registrations win for shared extensions
    pub fn register<P: DocumentParser>(&mut self, parser: P) {
        self.parsers.insert(0, Box::new(parser));
    }

    /// Find parser for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn DocumentParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(path))
            .map(|p| &**p)
    }

    /// Find parser registered for an extension (without dot)
    #[must_use]
    pub fn find_for_extension(&self, extension: &str) -> Option<&dyn DocumentParser> {
        self.parsers
            .iter()
            .find(|p| p.extensions().iter().any(|known| known.eq_ignore_ascii_case(extension)))
            .map(|p| &**p)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions())
            .copied()
            .collect()
    }
}

/// Registry with the built-in JSON and YAML parsers
#[inline]
#[must_use]
pub fn default_parsers() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(JsonParser);
    registry.register(YamlParser);
    registry
}
