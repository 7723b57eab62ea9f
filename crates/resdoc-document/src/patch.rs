//! Patch computation and application
//!
//! [`compute_patch`] produces the ordered [`PatchOp`]s that turn one document
//! into another. Mappings are diffed key by key; sequences and scalars are
//! atomic and replaced whole when they differ. The wire form of a [`Patch`]
//! is a JSON Patch (RFC 6902) array:
//!
//! ```json
//! [{"op":"remove","path":"/x"},{"op":"add","path":"/spec","value":{"replicas":3}}]
//! ```
//!
//! [`Patch::apply`] implements the add/remove/replace subset of RFC 6902.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::path::{DocPath, PathToken};
use crate::value::{Document, DocumentKind};

/// Single patch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Insert a value; replaces an existing mapping entry
    Add {
        /// Target location
        path: DocPath,
        /// Inserted value
        value: Document,
    },

    /// Remove the value at a location
    ///
    /// Fails if the location doesn't exist.
    Remove {
        /// Target location
        path: DocPath,
    },

    /// Replace the value at a location
    ///
    /// Fails if the location doesn't exist.
    Replace {
        /// Target location
        path: DocPath,
        /// New value
        value: Document,
    },
}

impl PatchOp {
    /// Create add operation
    #[inline]
    #[must_use]
    pub fn add(path: DocPath, value: impl Into<Document>) -> Self {
        Self::Add {
            path,
            value: value.into(),
        }
    }

    /// Create remove operation
    #[inline]
    #[must_use]
    pub fn remove(path: DocPath) -> Self {
        Self::Remove { path }
    }

    /// Create replace operation
    #[inline]
    #[must_use]
    pub fn replace(path: DocPath, value: impl Into<Document>) -> Self {
        Self::Replace {
            path,
            value: value.into(),
        }
    }

    /// Wire name of the operation
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
        }
    }

    /// Target location
    #[must_use]
    pub fn path(&self) -> &DocPath {
        match self {
            Self::Add { path, .. } | Self::Remove { path } | Self::Replace { path, .. } => path,
        }
    }

    /// Value carried by add / replace
    #[must_use]
    pub fn value(&self) -> Option<&Document> {
        match self {
            Self::Add { value, .. } | Self::Replace { value, .. } => Some(value),
            Self::Remove { .. } => None,
        }
    }

    /// JSON Patch object for this operation
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self.value() {
            Some(value) => json!({
                "op": self.name(),
                "path": self.path().to_pointer(),
                "value": value.to_json_value(),
            }),
            None => json!({
                "op": self.name(),
                "path": self.path().to_pointer(),
            }),
        }
    }

    fn apply_to(&self, doc: &mut Document) -> Result<(), PatchError> {
        let path = self.path();
        let Some((last, parents)) = path.split_last() else {
            return match self {
                Self::Add { value, .. } | Self::Replace { value, .. } => {
                    *doc = value.clone();
                    Ok(())
                }
                Self::Remove { .. } => Err(PatchError::InvalidTarget {
                    path: path.clone(),
                    kind: doc.kind(),
                }),
            };
        };

        let parent = resolve_mut(doc, parents, path)?;
        match (self, parent) {
            (Self::Add { value, .. }, Document::Mapping(map)) => {
                map.insert(last.as_key().into_owned(), value.clone());
                Ok(())
            }
            (Self::Add { value, .. }, Document::Sequence(items)) => {
                let index = if last.is_end() {
                    items.len()
                } else {
                    sequence_index(last, items.len(), path)?
                };
                items.insert(index, value.clone());
                Ok(())
            }
            (Self::Remove { .. }, Document::Mapping(map)) => map
                .shift_remove(last.as_key().as_ref())
                .map(drop)
                .ok_or_else(|| PatchError::PathNotFound(path.clone())),
            (Self::Remove { .. }, Document::Sequence(items)) => {
                let index = existing_index(last, items.len(), path)?;
                items.remove(index);
                Ok(())
            }
            (Self::Replace { value, .. }, Document::Mapping(map)) => {
                let slot = map
                    .get_mut(last.as_key().as_ref())
                    .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
                *slot = value.clone();
                Ok(())
            }
            (Self::Replace { value, .. }, Document::Sequence(items)) => {
                let index = existing_index(last, items.len(), path)?;
                items[index] = value.clone();
                Ok(())
            }
            (_, parent @ Document::Scalar(_)) => Err(PatchError::InvalidTarget {
                path: path.clone(),
                kind: parent.kind(),
            }),
        }
    }
}

impl Display for PatchOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{} {} {}", self.name(), self.path(), value),
            None => write!(f, "{} {}", self.name(), self.path()),
        }
    }
}

fn resolve_mut<'a>(
    doc: &'a mut Document,
    tokens: &[PathToken],
    path: &DocPath,
) -> Result<&'a mut Document, PatchError> {
    tokens.iter().try_fold(doc, |node, token| match node {
        Document::Mapping(map) => map
            .get_mut(token.as_key().as_ref())
            .ok_or_else(|| PatchError::PathNotFound(path.clone())),
        Document::Sequence(items) => {
            let index = existing_index(token, items.len(), path)?;
            Ok(&mut items[index])
        }
        scalar @ Document::Scalar(_) => Err(PatchError::InvalidTarget {
            path: path.clone(),
            kind: scalar.kind(),
        }),
    })
}

fn sequence_index(token: &PathToken, len: usize, path: &DocPath) -> Result<usize, PatchError> {
    let index = token.as_index().ok_or_else(|| PatchError::InvalidTarget {
        path: path.clone(),
        kind: DocumentKind::Sequence,
    })?;
    if index > len {
        return Err(PatchError::IndexOutOfBounds {
            path: path.clone(),
            index,
            len,
        });
    }
    Ok(index)
}

fn existing_index(token: &PathToken, len: usize, path: &DocPath) -> Result<usize, PatchError> {
    let index = sequence_index(token, len, path)?;
    if index == len {
        return Err(PatchError::IndexOutOfBounds {
            path: path.clone(),
            index,
            len,
        });
    }
    Ok(index)
}

/// Ordered list of patch operations
///
/// Operations apply one after another against a single document state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    ops: Vec<PatchOp>,
}

impl Patch {
    /// Create patch from operations
    #[inline]
    #[must_use]
    pub fn new(ops: Vec<PatchOp>) -> Self {
        Self { ops }
    }

    /// Check if patch has no operations
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Operations in application order
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    /// Iterate over operations
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PatchOp> {
        self.ops.iter()
    }

    /// Consume into operations
    #[inline]
    #[must_use]
    pub fn into_ops(self) -> Vec<PatchOp> {
        self.ops
    }

    /// Apply to a copy of `doc`
    ///
    /// # Errors
    /// Returns the first operation failure; `doc` is never modified.
    pub fn apply(&self, doc: &Document) -> Result<Document, PatchError> {
        let mut out = doc.clone();
        for op in &self.ops {
            op.apply_to(&mut out)?;
        }
        Ok(out)
    }

    /// JSON Patch array
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        JsonValue::Array(self.ops.iter().map(PatchOp::to_json_value).collect())
    }

    /// Compact JSON Patch text
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }
}

impl From<Vec<PatchOp>> for Patch {
    fn from(ops: Vec<PatchOp>) -> Self {
        Self::new(ops)
    }
}

impl FromIterator<PatchOp> for Patch {
    fn from_iter<I: IntoIterator<Item = PatchOp>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Patch {
    type Item = PatchOp;
    type IntoIter = std::vec::IntoIter<PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOp;
    type IntoIter = std::slice::Iter<'a, PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Operations that turn `current` into `desired`
///
/// Removals of a mapping come first, in `current`'s key order, followed by
/// additions and changes in `desired`'s key order. Equal inputs give an
/// empty patch.
#[must_use]
pub fn compute_patch(current: &Document, desired: &Document) -> Patch {
    let mut ops = Vec::new();
    diff_into(&DocPath::root(), current, desired, &mut ops);
    tracing::trace!(ops = ops.len(), "computed patch");
    Patch { ops }
}

fn diff_into(path: &DocPath, current: &Document, desired: &Document, ops: &mut Vec<PatchOp>) {
    if current == desired {
        return;
    }
    match (current, desired) {
        (Document::Mapping(current_map), Document::Mapping(desired_map)) => {
            ops.extend(
                current_map
                    .keys()
                    .filter(|key| !desired_map.contains_key(*key))
                    .map(|key| PatchOp::remove(path.key(key))),
            );
            for (key, desired_val) in desired_map {
                match current_map.get(key) {
                    Some(current_val) => diff_into(&path.key(key), current_val, desired_val, ops),
                    None => ops.push(PatchOp::add(path.key(key), desired_val.clone())),
                }
            }
        }
        _ => ops.push(PatchOp::replace(path.clone(), desired.clone())),
    }
}

/// Errors raised while applying a patch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// A mapping key along the path is missing
    #[error("path not found: '{0}'")]
    PathNotFound(DocPath),

    /// The path steps into a node that cannot hold it
    #[error("path '{path}' cannot be addressed inside a {kind}")]
    InvalidTarget {
        /// Operation path
        path: DocPath,
        /// Kind of the offending node
        kind: DocumentKind,
    },

    /// Sequence index past the end
    #[error("index {index} out of bounds for sequence of length {len} at '{path}'")]
    IndexOutOfBounds {
        /// Operation path
        path: DocPath,
        /// Requested index
        index: usize,
        /// Sequence length
        len: usize,
    },
}
