//! Testing utilities for resdoc workspace
//!
//! Shared fixtures, proptest strategies and on-disk helpers.

#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use proptest::prelude::*;
use resdoc_document::{with_config_annotation, Document, Resource, Scalar};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const TEST_ANNOTATION: &str = "resdoc.test/last-applied";

pub fn doc(value: Value) -> Document {
    Document::from(value)
}

pub fn resource(value: Value) -> Resource {
    Resource::from_value(value).unwrap()
}

pub fn config_map(name: &str, data: Value) -> Document {
    doc(json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {"name": name, "namespace": "default"},
        "data": data
    }))
}

pub fn deployment(name: &str, replicas: u64) -> Document {
    doc(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "labels": {"app": name}},
        "spec": {
            "replicas": replicas,
            "template": {
                "spec": {
                    "containers": [{"name": name, "image": format!("{name}:latest")}]
                }
            }
        }
    }))
}

/// `live` with `snapshot` stored under [`TEST_ANNOTATION`]
pub fn with_snapshot(live: &Document, snapshot: &Document) -> Document {
    with_config_annotation(live, TEST_ANNOTATION, snapshot).unwrap()
}

/// Temporary directory populated with `(relative path, contents)` entries
pub fn fixture_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, contents) in files {
        write_file(dir.path(), name, contents);
    }
    dir
}

pub fn write_file(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn arb_scalar() -> impl Strategy<Value = Document> {
    prop_oneof![
        Just(Document::Scalar(Scalar::Null)),
        any::<bool>().prop_map(Document::from),
        any::<i64>().prop_map(Document::from),
        (-1.0e6..1.0e6f64).prop_map(Document::from),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Document::from),
    ]
}

/// Mapping keys, including characters that need pointer escaping
pub fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z]{1,6}",
        1 => "[0-9]{1,2}",
        1 => "[a-z/~.-]{1,4}",
    ]
}

pub fn arb_document() -> impl Strategy<Value = Document> {
    arb_scalar().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Document::from),
            prop::collection::vec((arb_key(), inner), 0..5)
                .prop_map(|entries| entries.into_iter().collect::<Document>()),
        ]
    })
}

pub fn arb_mapping() -> impl Strategy<Value = Document> {
    prop::collection::vec((arb_key(), arb_document()), 0..6)
        .prop_map(|entries| entries.into_iter().collect::<Document>())
}
