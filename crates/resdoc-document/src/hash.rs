//! Document fingerprints
//!
//! Provides [`Fingerprint`], a strongly-typed 32-byte BLAKE3 digest of a
//! document's canonical form, used for cheap change detection.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::canonical::canonical_form;
use crate::value::Document;

/// A 32-byte structural digest (BLAKE3)
///
/// Structurally equal documents (mapping key order ignored) always have
/// equal fingerprints. Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Create a fingerprint from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Fingerprint of a document
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        Self::compute(canonical_form(doc).as_bytes())
    }

    /// BLAKE3 digest of arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create fingerprint from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| HashError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8; 32]> for Fingerprint {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<&Document> for Fingerprint {
    fn from(doc: &Document) -> Self {
        Self::of(doc)
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = <std::borrow::Cow<'de, str> as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing fingerprints
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Invalid digest length
    #[error("invalid fingerprint length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from(value)
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let d = doc(json!({"kind": "ConfigMap", "data": {"a": "1"}}));
        assert_eq!(Fingerprint::of(&d), Fingerprint::of(&d.clone()));
    }

    #[test]
    fn fingerprint_ignores_key_order() {
        let a: Document = serde_json::from_str(r#"{"a": 1, "b": {"c": 2, "d": 3}}"#).unwrap();
        let b: Document = serde_json::from_str(r#"{"b": {"d": 3, "c": 2}, "a": 1}"#).unwrap();
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn fingerprint_respects_sequence_order() {
        assert_ne!(
            Fingerprint::of(&doc(json!({"a": [1, 2]}))),
            Fingerprint::of(&doc(json!({"a": [2, 1]})))
        );
    }

    #[test]
    fn fingerprint_sensitive_to_nested_scalar() {
        let a = doc(json!({"spec": {"template": {"replicas": 3}}}));
        let b = doc(json!({"spec": {"template": {"replicas": 4}}}));
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn fingerprint_distinguishes_number_kinds() {
        assert_ne!(Fingerprint::of(&doc(json!(1))), Fingerprint::of(&doc(json!(1.0))));
    }

    #[test]
    fn fingerprint_distinguishes_string_and_number() {
        assert_ne!(Fingerprint::of(&doc(json!("1"))), Fingerprint::of(&doc(json!(1))));
    }

    #[test]
    fn fingerprint_from_slice_invalid_length() {
        let result = Fingerprint::from_slice(&[1u8; 31]);
        assert!(matches!(
            result,
            Err(HashError::InvalidLength { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn fingerprint_display_and_parse() {
        let fp = Fingerprint::of(&doc(json!({"a": 1})));
        let text = fp.to_string();
        assert_eq!(text.len(), 64);
        let parsed: Fingerprint = text.parse().unwrap();
        assert_eq!(fp, parsed);
    }

    #[test]
    fn fingerprint_short_is_prefix() {
        let fp = Fingerprint::compute(b"test");
        assert_eq!(fp.short().len(), 16);
        assert!(fp.to_string().starts_with(&fp.short()));
    }

    #[test]
    fn fingerprint_parse_rejects_bad_hex() {
        let result: Result<Fingerprint, _> = "zz".parse();
        assert!(matches!(result, Err(HashError::HexDecode(_))));
    }

    #[test]
    fn fingerprint_serde_hex() {
        let fp = Fingerprint::compute(b"test");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
        let decoded: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, decoded);
    }
}
