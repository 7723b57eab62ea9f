//! YAML document parser
//!
//! Uses serde_yaml for multi-document streams. Empty and null documents in
//! a stream (for example a trailing `---`) are skipped.

use std::path::Path;

use resdoc_document::Document;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{LoadError, LoadResult};
use crate::parsers::DocumentParser;

/// YAML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Create new YAML parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for YamlParser {
    fn parse(&self, source: &str, origin: &Path) -> LoadResult<Vec<Document>> {
        let mut documents = Vec::new();
        for (index, de) in serde_yaml::Deserializer::from_str(source).enumerate() {
            let value = Value::deserialize(de)
                .map_err(|e| LoadError::syntax(origin, format!("YAML parse error: {e}")))?;
            if value.is_null() {
                tracing::trace!(origin = %origin.display(), index, "skipping empty YAML document");
                continue;
            }
            let doc = Document::try_from(value).map_err(|e| LoadError::document(origin, e))?;
            documents.push(doc);
        }
        Ok(documents)
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(source: &str) -> LoadResult<Vec<Document>> {
        YamlParser.parse(source, Path::new("input.yaml"))
    }

    #[test]
    fn yaml_parser_valid() {
        let content = r"
name: test
value: 42
nested:
  key: value
";
        let docs = parse(content).unwrap();
        assert_eq!(
            docs,
            vec![Document::from(json!({"name": "test", "value": 42, "nested": {"key": "value"}}))]
        );
    }

    #[test]
    fn yaml_parser_multi_document() {
        let content = r"
---
name: doc1
---
name: doc2
---
";
        let docs = parse(content).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].get_key("name").and_then(Document::as_str), Some("doc2"));
    }

    #[test]
    fn yaml_parser_preserves_key_order() {
        let docs = parse("z: 1\na: 2\nm: 3\n").unwrap();
        let keys: Vec<_> = docs[0].as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn yaml_parser_invalid_syntax() {
        let err = parse("key: [unclosed").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
    }

    #[test]
    fn yaml_parser_tagged_value_is_invalid_document() {
        let err = parse("value: !Secret abc\n").unwrap_err();
        assert!(matches!(err, LoadError::Document { .. }));
    }

    #[test]
    fn yaml_parser_empty_stream() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("---\n").unwrap().is_empty());
    }
}
