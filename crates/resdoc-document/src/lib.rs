//! resdoc document engine
//!
//! Structural merge, fingerprint and patch operations over generic
//! configuration documents.
//!
//! # Core Concepts
//!
//! - [`Document`]: mapping / sequence / scalar tree with order-insensitive
//!   mapping equality
//! - [`merge`]: deep merge where the overlay wins and sequences are replaced
//! - [`Fingerprint`]: 32-byte BLAKE3 digest of a document's canonical form
//! - [`compute_patch`] / [`Patch`]: JSON Patch style diff between documents
//! - [`current_config`]: last-applied snapshot stored in an annotation
//! - [`Resource`]: mapping-rooted document with a memoized checksum
//!
//! # Example
//!
//! ```rust
//! use resdoc_document::{compute_patch, merge, Document};
//! use serde_json::json;
//!
//! let base = Document::from(json!({"spec": {"replicas": 1, "ports": [80]}}));
//! let overlay = Document::from(json!({"spec": {"ports": [443]}}));
//! let merged = merge(&base, &overlay);
//! assert_eq!(merged, Document::from(json!({"spec": {"replicas": 1, "ports": [443]}})));
//!
//! let patch = compute_patch(&base, &merged);
//! assert_eq!(patch.apply(&base).unwrap(), merged);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod annotation;
mod canonical;
mod error;
mod hash;
mod merge;
mod patch;
mod path;
mod resource;
mod value;

// Re-exports
pub use annotation::{can_patch, current_config, with_config_annotation, DEFAULT_CONFIG_ANNOTATION};
pub use canonical::{canonical_form, sort_documents, to_compact_json};
pub use error::{DocumentError, DocumentResult};
pub use hash::{Fingerprint, HashError};
pub use merge::{merge, merge_all, merge_into};
pub use patch::{compute_patch, Patch, PatchError, PatchOp};
pub use path::{DocPath, PathError, PathToken};
pub use resource::Resource;
pub use value::{Document, DocumentKind, Mapping, Scalar};

/// Fingerprint of a document
///
/// Shorthand for [`Fingerprint::of`].
#[inline]
#[must_use]
pub fn fingerprint(doc: &Document) -> Fingerprint {
    Fingerprint::of(doc)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
