//! JSON document parser
//!
//! Accepts a single value or several whitespace-separated values.

use std::path::Path;

use resdoc_document::Document;

use crate::error::{LoadError, LoadResult};
use crate::parsers::DocumentParser;

/// JSON parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Create new JSON parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for JsonParser {
    fn parse(&self, source: &str, origin: &Path) -> LoadResult<Vec<Document>> {
        serde_json::Deserializer::from_str(source)
            .into_iter::<Document>()
            .map(|doc| doc.map_err(|e| LoadError::syntax(origin, format!("JSON parse error: {e}"))))
            .collect()
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}
