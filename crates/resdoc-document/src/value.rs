//! Generic document model
//!
//! Provides [`Document`], the mapping / sequence / scalar tree that every
//! other part of the crate operates on.
//!
//! # Scalar equality
//!
//! Numbers keep the kind they were decoded with ([`serde_json::Number`]
//! distinguishes unsigned, negative and floating point values). Two scalars
//! are equal only when both kind and value match, so `1` and `1.0` are
//! different documents with different fingerprints.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde_json::{Number, Value as JsonValue};
use serde_yaml::Value as YamlValue;

use crate::canonical;
use crate::error::{DocumentError, DocumentResult};
use crate::path::{DocPath, PathToken};

/// Ordered mapping of unique string keys
///
/// Equality ignores key order; iteration follows insertion order.
pub type Mapping = IndexMap<String, Document>;

/// Leaf value of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number, kind preserved
    Number(Number),
    /// String
    String(String),
}

/// Semi-structured document node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// String-keyed mapping
    Mapping(Mapping),
    /// Ordered sequence
    Sequence(Vec<Document>),
    /// Leaf value
    Scalar(Scalar),
}

/// Shape of a document node, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Mapping,
    Sequence,
    Null,
    Bool,
    Number,
    String,
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mapping => "mapping",
            Self::Sequence => "sequence",
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
        })
    }
}

impl Document {
    /// Empty mapping
    #[inline]
    #[must_use]
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// Explicit null
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Build a document from any serializable value
    ///
    /// Struct field order is preserved.
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if the value cannot be
    /// represented as a document (for example a map with non-scalar keys).
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> DocumentResult<Self> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| DocumentError::invalid_shape(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| DocumentError::invalid_shape(e.to_string()))
    }

    /// Shape of this node
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Mapping(_) => DocumentKind::Mapping,
            Self::Sequence(_) => DocumentKind::Sequence,
            Self::Scalar(Scalar::Null) => DocumentKind::Null,
            Self::Scalar(Scalar::Bool(_)) => DocumentKind::Bool,
            Self::Scalar(Scalar::Number(_)) => DocumentKind::Number,
            Self::Scalar(Scalar::String(_)) => DocumentKind::String,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    #[inline]
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Scalar(Scalar::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// Value under `key` if this is a mapping
    #[inline]
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&Document> {
        self.as_mapping()?.get(key)
    }

    /// Walk a chain of mapping keys
    #[must_use]
    pub fn dig(&self, keys: &[&str]) -> Option<&Document> {
        keys.iter().try_fold(self, |node, key| node.get_key(key))
    }

    /// String found by walking a chain of mapping keys
    #[must_use]
    pub fn dig_str(&self, keys: &[&str]) -> Option<&str> {
        self.dig(keys)?.as_str()
    }

    /// Node at `path`, if every step exists
    ///
    /// Index tokens on a mapping are looked up as keys of the same digits.
    #[must_use]
    pub fn get(&self, path: &DocPath) -> Option<&Document> {
        path.iter().try_fold(self, |node, token| node.step(token))
    }

    /// Node at a JSON Pointer; `None` for missing nodes and malformed pointers
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Document> {
        let path: DocPath = pointer.parse().ok()?;
        self.get(&path)
    }

    /// `metadata.annotations` of a resource document
    #[must_use]
    pub fn metadata_annotations(&self) -> Option<&Mapping> {
        self.dig(&["metadata", "annotations"])?.as_mapping()
    }

    pub(crate) fn step(&self, token: &PathToken) -> Option<&Document> {
        match self {
            Self::Mapping(map) => map.get(token.as_key().as_ref()),
            Self::Sequence(items) => items.get(token.as_index()?),
            Self::Scalar(_) => None,
        }
    }

    /// Convert into a `serde_json` value
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Self::Mapping(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect(),
            ),
            Self::Sequence(items) => {
                JsonValue::Array(items.iter().map(Self::to_json_value).collect())
            }
            Self::Scalar(Scalar::Null) => JsonValue::Null,
            Self::Scalar(Scalar::Bool(b)) => JsonValue::Bool(*b),
            Self::Scalar(Scalar::Number(n)) => JsonValue::Number(n.clone()),
            Self::Scalar(Scalar::String(s)) => JsonValue::String(s.clone()),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::mapping()
    }
}

/// Compact JSON, keys in insertion order
impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical::to_compact_json(self))
    }
}

impl From<Scalar> for Document {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Mapping> for Document {
    fn from(map: Mapping) -> Self {
        Self::Mapping(map)
    }
}

impl From<Vec<Document>> for Document {
    fn from(items: Vec<Document>) -> Self {
        Self::Sequence(items)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s))
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Document {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<u64> for Document {
    fn from(n: u64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

/// Non-finite floats become null, matching `serde_json`
///
/// Decoding from YAML or any serde format rejects them instead.
impl From<f64> for Document {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or_else(Self::null, |n| Self::Scalar(Scalar::Number(n)))
    }
}

impl FromIterator<(String, Document)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Document)>>(iter: I) -> Self {
        Self::Mapping(iter.into_iter().collect())
    }
}

impl FromIterator<Document> for Document {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self::Sequence(iter.into_iter().collect())
    }
}

impl From<JsonValue> for Document {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::null(),
            JsonValue::Bool(b) => b.into(),
            JsonValue::Number(n) => Self::Scalar(Scalar::Number(n)),
            JsonValue::String(s) => s.into(),
            JsonValue::Array(items) => items.into_iter().map(Self::from).collect(),
            JsonValue::Object(map) => map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
        }
    }
}

impl From<&Document> for JsonValue {
    fn from(doc: &Document) -> Self {
        doc.to_json_value()
    }
}

impl TryFrom<YamlValue> for Document {
    type Error = DocumentError;

    fn try_from(value: YamlValue) -> Result<Self, Self::Error> {
        Ok(match value {
            YamlValue::Null => Self::null(),
            YamlValue::Bool(b) => b.into(),
            YamlValue::Number(n) => yaml_number(&n)?,
            YamlValue::String(s) => s.into(),
            YamlValue::Sequence(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<DocumentResult<Vec<_>>>()?
                .into(),
            YamlValue::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    let key = yaml_key(key)?;
                    if out.contains_key(&key) {
                        return Err(DocumentError::invalid_shape(format!(
                            "duplicate mapping key '{key}'"
                        )));
                    }
                    out.insert(key, Self::try_from(value)?);
                }
                Self::Mapping(out)
            }
            YamlValue::Tagged(tagged) => {
                return Err(DocumentError::invalid_shape(format!(
                    "tagged value {} is not a mapping, sequence or scalar",
                    tagged.tag
                )));
            }
        })
    }
}

fn yaml_number(n: &serde_yaml::Number) -> DocumentResult<Document> {
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .map(|n| Document::Scalar(Scalar::Number(n)))
        .ok_or_else(|| DocumentError::invalid_shape(format!("non-finite number {n}")))
}

/// Scalar keys become their text form; composite keys are rejected
fn yaml_key(key: YamlValue) -> DocumentResult<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) | YamlValue::Tagged(_) => Err(
            DocumentError::invalid_shape("mapping keys must be scalars"),
        ),
    }
}

impl serde::Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Number(n)) => serde::Serialize::serialize(n, serializer),
            Self::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("a mapping, sequence or scalar")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Document, E> {
        Ok(v.into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Document, E> {
        Ok(v.into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Document, E> {
        Ok(v.into())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Document, E> {
        Number::from_f64(v)
            .map(|n| Document::Scalar(Scalar::Number(n)))
            .ok_or_else(|| E::custom(format!("non-finite number {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Document, E> {
        Ok(v.into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Document, E> {
        Ok(v.into())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Document, E> {
        Ok(Document::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<Document, E> {
        Ok(Document::null())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Document, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde::Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Document, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Document::Sequence(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Document, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = Mapping::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(key) = access.next_key_seed(KeySeed)? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate mapping key '{key}'")));
            }
            let value = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Document::Mapping(map))
    }
}

/// Normalizes scalar mapping keys to strings while deserializing
struct KeySeed;

impl<'de> DeserializeSeed<'de> for KeySeed {
    type Value = String;

    fn deserialize<D>(self, deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl Visitor<'_> for KeySeed {
    type Value = String;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("a scalar mapping key")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(Number::from_f64(v).map_or_else(|| v.to_string(), |n| n.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok("null".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: JsonValue) -> Document {
        Document::from(value)
    }

    #[test]
    fn equality_ignores_mapping_order() {
        let a: Document = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let b: Document = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_sequence_order() {
        assert_ne!(doc(json!([1, 2])), doc(json!([2, 1])));
    }

    #[test]
    fn integer_and_float_are_distinct() {
        let int: Document = serde_json::from_str("1").unwrap();
        let float: Document = serde_json::from_str("1.0").unwrap();
        assert_ne!(int, float);
        assert_eq!(int.kind(), DocumentKind::Number);
    }

    #[test]
    fn deserialize_preserves_key_order() {
        let parsed: Document = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<_> = parsed.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn deserialize_rejects_duplicate_keys() {
        let result: Result<Document, _> = serde_json::from_str(r#"{"a": 1, "a": 2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn yaml_keys_normalize_to_strings() {
        let yaml: YamlValue = serde_yaml::from_str("1: one\ntrue: yes\nname: x\n").unwrap();
        let parsed = Document::try_from(yaml).unwrap();
        assert_eq!(parsed.get_key("1").and_then(Document::as_str), Some("one"));
        assert_eq!(parsed.get_key("true").and_then(Document::as_str), Some("yes"));
        assert_eq!(parsed.get_key("name").and_then(Document::as_str), Some("x"));
    }

    #[test]
    fn yaml_composite_keys_are_invalid() {
        let yaml: YamlValue = serde_yaml::from_str("? [a, b]\n: value\n").unwrap();
        let result = Document::try_from(yaml);
        assert!(matches!(result, Err(DocumentError::InvalidShape(_))));
    }

    #[test]
    fn yaml_tagged_values_are_invalid() {
        let yaml: YamlValue = serde_yaml::from_str("value: !Ref other\n").unwrap();
        let result = Document::try_from(yaml);
        assert!(matches!(result, Err(DocumentError::InvalidShape(_))));
    }

    #[test]
    fn yaml_numbers_keep_kind() {
        let yaml: YamlValue = serde_yaml::from_str("a: 3\nb: -2\nc: 1.5\n").unwrap();
        let parsed = Document::try_from(yaml).unwrap();
        assert_eq!(parsed, doc(json!({"a": 3, "b": -2, "c": 1.5})));
    }

    #[test]
    fn from_serialize_keeps_field_order() {
        #[derive(serde::Serialize)]
        struct Meta {
            name: String,
            labels: Vec<String>,
        }

        let parsed = Document::from_serialize(&Meta {
            name: "web".into(),
            labels: vec!["a".into()],
        })
        .unwrap();
        let keys: Vec<_> = parsed.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "labels"]);
    }

    #[test]
    fn from_serialize_rejects_non_string_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(vec![1u8], "x");
        let result = Document::from_serialize(&map);
        assert!(matches!(result, Err(DocumentError::InvalidShape(_))));
    }

    #[test]
    fn path_accessors() {
        let d = doc(json!({"spec": {"containers": [{"name": "web"}]}}));
        let path = DocPath::root().key("spec").key("containers").index(0).key("name");
        assert_eq!(d.get(&path).and_then(Document::as_str), Some("web"));
        assert_eq!(d.pointer("/spec/containers/0/name"), d.get(&path));
        assert!(d.pointer("/spec/missing").is_none());
        assert!(d.pointer("no-slash").is_none());
    }

    #[test]
    fn index_tokens_address_numeric_keys() {
        let d = doc(json!({"ports": {"80": "http"}}));
        assert_eq!(d.pointer("/ports/80").and_then(Document::as_str), Some("http"));
    }

    #[test]
    fn dig_and_annotations() {
        let d = doc(json!({"metadata": {"name": "x", "annotations": {"k": "v"}}}));
        assert_eq!(d.dig_str(&["metadata", "name"]), Some("x"));
        assert_eq!(
            d.metadata_annotations().and_then(|a| a.get("k")),
            Some(&Document::from("v"))
        );
        assert!(doc(json!({"metadata": {}})).metadata_annotations().is_none());
    }

    #[test]
    fn json_value_roundtrip() {
        let value = json!({"a": [1, "two", null, true, 2.5], "b": {}});
        assert_eq!(doc(value.clone()).to_json_value(), value);
    }

    #[test]
    fn serialize_to_json_and_yaml() {
        let d = doc(json!({"name": "x", "replicas": 3}));
        assert_eq!(serde_json::to_string(&d).unwrap(), r#"{"name":"x","replicas":3}"#);
        let yaml = serde_yaml::to_string(&d).unwrap();
        assert_eq!(yaml, "name: x\nreplicas: 3\n");
    }

    #[test]
    fn display_is_compact_json() {
        let d = doc(json!({"a": [1, 2]}));
        assert_eq!(d.to_string(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn non_finite_float_is_null() {
        assert!(Document::from(f64::NAN).is_null());
    }

    #[test]
    fn yaml_non_finite_numbers_are_invalid() {
        for text in ["a: .inf\n", "a: -.inf\n", "a: .nan\n"] {
            let yaml: YamlValue = serde_yaml::from_str(text).unwrap();
            let result = Document::try_from(yaml);
            assert!(matches!(result, Err(DocumentError::InvalidShape(_))), "{text}");
        }
    }

    #[test]
    fn deserialize_rejects_non_finite_numbers() {
        assert!(serde_yaml::from_str::<Document>("a: .inf\n").is_err());
        assert!(serde_yaml::from_str::<Document>("[.nan]").is_err());
        let parsed: Document = serde_yaml::from_str("a: 1.5\n").unwrap();
        assert_eq!(parsed, doc(json!({"a": 1.5})));
    }

    #[test]
    fn json_value_keeps_key_order() {
        let d = doc(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<_> = d.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
