//! Mapping-rooted documents with a memoized fingerprint
//!
//! [`Resource`] is the unit callers pass around: a single configuration
//! object (`kind`, `metadata`, `spec`, ...) whose checksum is computed on
//! first use and kept until the document is mutated through
//! [`Resource::document_mut`] or explicitly invalidated.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use serde_json::Value as JsonValue;

use crate::annotation;
use crate::error::{DocumentError, DocumentResult};
use crate::hash::Fingerprint;
use crate::merge::merge;
use crate::patch::{compute_patch, Patch};
use crate::value::Document;

/// A configuration object
///
/// # Invariants
/// - The root is always a mapping
/// - A cached fingerprint always matches the current document
#[derive(Debug, Clone, Default)]
pub struct Resource {
    doc: Document,
    fingerprint: OnceLock<Fingerprint>,
}

impl Resource {
    /// Wrap a mapping-rooted document
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if the root is not a mapping
    pub fn new(doc: Document) -> DocumentResult<Self> {
        if !doc.is_mapping() {
            return Err(DocumentError::invalid_shape(format!(
                "resource root must be a mapping, found {}",
                doc.kind()
            )));
        }
        Ok(Self::from_mapping(doc))
    }

    fn from_mapping(doc: Document) -> Self {
        Self {
            doc,
            fingerprint: OnceLock::new(),
        }
    }

    /// Parse a JSON object, keeping its key order
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if the text is not valid JSON
    /// or not an object
    pub fn from_json(text: &str) -> DocumentResult<Self> {
        let doc: Document = serde_json::from_str(text)
            .map_err(|e| DocumentError::invalid_shape(format!("invalid JSON: {e}")))?;
        Self::new(doc)
    }

    /// Build from a decoded JSON value
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if the value is not an object
    pub fn from_value(value: JsonValue) -> DocumentResult<Self> {
        Self::new(Document::from(value))
    }

    /// Build from any serializable value
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if the value does not
    /// serialize to a mapping
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> DocumentResult<Self> {
        Self::new(Document::from_serialize(value)?)
    }

    /// Underlying document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access; drops the cached fingerprint
    ///
    /// Replacing the root with a non-mapping breaks the resource invariant;
    /// use [`Resource::set_document`] to swap the whole document.
    pub fn document_mut(&mut self) -> &mut Document {
        self.invalidate();
        &mut self.doc
    }

    /// Replace the whole document
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if the root is not a mapping
    pub fn set_document(&mut self, doc: Document) -> DocumentResult<()> {
        *self = Self::new(doc)?;
        Ok(())
    }

    /// Consume into the underlying document
    #[inline]
    #[must_use]
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Drop the cached fingerprint
    #[inline]
    pub fn invalidate(&mut self) {
        self.fingerprint.take();
    }

    /// `kind` field, if set
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.doc.dig_str(&["kind"])
    }

    /// `metadata.name`, if set
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.doc.dig_str(&["metadata", "name"])
    }

    /// `metadata.namespace`, if set
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.doc.dig_str(&["metadata", "namespace"])
    }

    /// Deep merge another resource over this one
    #[must_use]
    pub fn merge(&self, attrs: &Resource) -> Resource {
        Self::from_mapping(merge(&self.doc, &attrs.doc))
    }

    /// Deep merge arbitrary attributes over this resource
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if `attrs` is not a mapping
    pub fn merge_attrs(&self, attrs: &Document) -> DocumentResult<Resource> {
        Self::new(merge(&self.doc, attrs))
    }

    /// Structural fingerprint, computed once
    #[must_use]
    pub fn checksum(&self) -> Fingerprint {
        *self.fingerprint.get_or_init(|| Fingerprint::of(&self.doc))
    }

    /// Whether the checksum has been computed and cached
    #[inline]
    #[must_use]
    pub fn has_cached_checksum(&self) -> bool {
        self.fingerprint.get().is_some()
    }

    /// Patch from the last-applied snapshot to `attrs`
    ///
    /// # Errors
    /// Returns [`DocumentError::AnnotationDecode`] if the stored snapshot is
    /// malformed
    pub fn merge_patch_ops(&self, attrs: &Document, annotation_key: &str) -> DocumentResult<Patch> {
        let current = self.current_config(annotation_key)?;
        Ok(compute_patch(&current, attrs))
    }

    /// Last-applied snapshot, see [`annotation::current_config`]
    ///
    /// # Errors
    /// Returns [`DocumentError::AnnotationDecode`] if the stored snapshot is
    /// malformed
    pub fn current_config(&self, annotation_key: &str) -> DocumentResult<Document> {
        annotation::current_config(&self.doc, annotation_key)
    }

    /// See [`annotation::can_patch`]
    #[must_use]
    pub fn can_patch(&self, annotation_key: &str) -> bool {
        annotation::can_patch(&self.doc, annotation_key)
    }

    /// Copy of this resource with `snapshot` recorded as last applied
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidShape`] if `metadata` or
    /// `metadata.annotations` is not a mapping
    pub fn with_config_annotation(
        &self,
        annotation_key: &str,
        snapshot: &Document,
    ) -> DocumentResult<Resource> {
        annotation::with_config_annotation(&self.doc, annotation_key, snapshot)
            .map(Self::from_mapping)
    }

    /// Compact JSON, keys in insertion order
    #[must_use]
    pub fn to_json(&self) -> String {
        self.doc.to_string()
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.kind(), self.name()) {
            (Some(kind), Some(name)) => write!(f, "{kind}/{name}"),
            (Some(kind), None) => f.write_str(kind),
            (None, Some(name)) => f.write_str(name),
            (None, None) => write!(f, "<{}>", self.checksum().short()),
        }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.doc == other.doc
    }
}

impl Eq for Resource {}

impl PartialOrd for Resource {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Resource {
    fn cmp(&self, other: &Self) -> Ordering {
        self.doc.cmp(&other.doc)
    }
}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum().hash(state);
    }
}

impl AsRef<Document> for Resource {
    fn as_ref(&self) -> &Document {
        &self.doc
    }
}

impl TryFrom<Document> for Resource {
    type Error = DocumentError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        Self::new(doc)
    }
}

impl From<Resource> for Document {
    fn from(resource: Resource) -> Self {
        resource.doc
    }
}

impl serde::Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.doc, serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let doc = <Document as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(doc).map_err(serde::de::Error::custom)
    }
}
