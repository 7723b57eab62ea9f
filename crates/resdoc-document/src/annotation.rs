//! Last-applied configuration stored in `metadata.annotations`
//!
//! A resource may carry a JSON snapshot of the document that was last applied
//! to it. Patches are computed against that snapshot rather than against the
//! live object, so fields filled in by the server never show up as changes.

use crate::error::{DocumentError, DocumentResult};
use crate::value::{Document, Mapping};

/// Annotation key used by `kubectl apply`
pub const DEFAULT_CONFIG_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Last-applied snapshot stored under `annotation_key`
///
/// A missing (or null) annotation yields an empty mapping. An empty or null
/// `metadata.namespace` in the snapshot is dropped.
///
/// # Errors
/// Returns [`DocumentError::AnnotationDecode`] if the annotation is not a
/// string holding a JSON mapping.
pub fn current_config(doc: &Document, annotation_key: &str) -> DocumentResult<Document> {
    let raw = match doc.metadata_annotations().and_then(|a| a.get(annotation_key)) {
        None => return Ok(Document::mapping()),
        Some(value) if value.is_null() => return Ok(Document::mapping()),
        Some(value) => value.as_str().ok_or_else(|| {
            DocumentError::annotation_decode(
                annotation_key,
                format!("expected a string, found {}", value.kind()),
            )
        })?,
    };

    let mut snapshot: Document = serde_json::from_str(raw)
        .map_err(|e| DocumentError::annotation_decode(annotation_key, e.to_string()))?;
    if !snapshot.is_mapping() {
        return Err(DocumentError::annotation_decode(
            annotation_key,
            format!("expected a mapping, found {}", snapshot.kind()),
        ));
    }

    strip_empty_namespace(&mut snapshot);
    Ok(snapshot)
}

/// Whether `annotation_key` holds a non-empty string
#[must_use]
pub fn can_patch(doc: &Document, annotation_key: &str) -> bool {
    doc.metadata_annotations()
        .and_then(|a| a.get(annotation_key))
        .and_then(Document::as_str)
        .is_some_and(|raw| !raw.is_empty())
}

/// Copy of `doc` with `snapshot` stored under `annotation_key`
///
/// Missing `metadata` and `metadata.annotations` mappings are created.
///
/// # Errors
/// Returns [`DocumentError::InvalidShape`] if `doc`, its `metadata` or its
/// `metadata.annotations` exist but are not mappings.
pub fn with_config_annotation(
    doc: &Document,
    annotation_key: &str,
    snapshot: &Document,
) -> DocumentResult<Document> {
    let mut out = doc.clone();
    let root = out
        .as_mapping_mut()
        .ok_or_else(|| DocumentError::invalid_shape("resource root must be a mapping"))?;
    let annotations = child_mapping(child_mapping(root, "metadata")?, "annotations")?;
    annotations.insert(annotation_key.to_string(), snapshot.to_string().into());
    Ok(out)
}

fn child_mapping<'a>(parent: &'a mut Mapping, key: &str) -> DocumentResult<&'a mut Mapping> {
    let entry = parent.entry(key.to_string()).or_insert_with(Document::mapping);
    if entry.is_null() {
        *entry = Document::mapping();
    }
    entry
        .as_mapping_mut()
        .ok_or_else(|| DocumentError::invalid_shape(format!("'{key}' must be a mapping")))
}

fn strip_empty_namespace(snapshot: &mut Document) {
    let Some(metadata) = snapshot
        .as_mapping_mut()
        .and_then(|root| root.get_mut("metadata"))
        .and_then(Document::as_mapping_mut)
    else {
        return;
    };
    let empty = metadata
        .get("namespace")
        .is_some_and(|ns| ns.is_null() || ns.as_str() == Some(""));
    if empty {
        metadata.shift_remove("namespace");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "example.com/last-applied";

    fn doc(value: serde_json::Value) -> Document {
        Document::from(value)
    }

    fn annotated(snapshot: &str) -> Document {
        doc(json!({"metadata": {"name": "x", "annotations": {KEY: snapshot}}}))
    }

    #[test]
    fn floats_read_back_exactly() {
        for ratio in [120_568.252_348_767_93, -999_244.519_783_026_8, 0.1, 1e-300] {
            let snapshot = doc(json!({"spec": {"ratio": ratio}}));
            let live = with_config_annotation(&doc(json!({})), KEY, &snapshot).unwrap();
            assert_eq!(current_config(&live, KEY).unwrap(), snapshot, "{ratio}");
        }
    }

    #[test]
    fn missing_annotation_is_empty_mapping() {
        let d = doc(json!({"metadata": {"name": "x"}}));
        assert_eq!(current_config(&d, KEY).unwrap(), Document::mapping());
        assert_eq!(current_config(&doc(json!({})), KEY).unwrap(), Document::mapping());
        assert_eq!(current_config(&doc(json!([1])), KEY).unwrap(), Document::mapping());
    }

    #[test]
    fn null_annotation_is_empty_mapping() {
        let d = doc(json!({"metadata": {"annotations": {KEY: null}}}));
        assert_eq!(current_config(&d, KEY).unwrap(), Document::mapping());
    }

    #[test]
    fn decodes_snapshot() {
        let d = annotated(r#"{"metadata":{"name":"x"},"data":{"a":"1"}}"#);
        assert_eq!(
            current_config(&d, KEY).unwrap(),
            doc(json!({"metadata": {"name": "x"}, "data": {"a": "1"}}))
        );
    }

    #[test]
    fn strips_empty_namespace() {
        let d = annotated(r#"{"metadata":{"namespace":"","name":"x"}}"#);
        assert_eq!(current_config(&d, KEY).unwrap(), doc(json!({"metadata": {"name": "x"}})));
    }

    #[test]
    fn strips_null_namespace() {
        let d = annotated(r#"{"metadata":{"namespace":null,"name":"x"}}"#);
        assert_eq!(current_config(&d, KEY).unwrap(), doc(json!({"metadata": {"name": "x"}})));
    }

    #[test]
    fn keeps_real_namespace() {
        let d = annotated(r#"{"metadata":{"namespace":"prod","name":"x"}}"#);
        assert_eq!(
            current_config(&d, KEY).unwrap(),
            doc(json!({"metadata": {"namespace": "prod", "name": "x"}}))
        );
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = current_config(&annotated("{not json"), KEY).unwrap_err();
        assert!(matches!(err, DocumentError::AnnotationDecode { ref key, .. } if key == KEY));
    }

    #[test]
    fn non_mapping_snapshot_is_decode_error() {
        let err = current_config(&annotated("[1, 2]"), KEY).unwrap_err();
        assert!(matches!(err, DocumentError::AnnotationDecode { .. }));
    }

    #[test]
    fn non_string_annotation_is_decode_error() {
        let d = doc(json!({"metadata": {"annotations": {KEY: {"nested": true}}}}));
        assert!(matches!(
            current_config(&d, KEY),
            Err(DocumentError::AnnotationDecode { .. })
        ));
    }

    #[test]
    fn can_patch_requires_non_empty_string() {
        assert!(!can_patch(&doc(json!({"metadata": {"annotations": {}}})), KEY));
        assert!(!can_patch(&doc(json!({"metadata": {}})), KEY));
        assert!(!can_patch(&annotated(""), KEY));
        assert!(!can_patch(&doc(json!({"metadata": {"annotations": {KEY: null}}})), KEY));
        assert!(can_patch(&annotated("{}"), KEY));
    }

    #[test]
    fn write_back_then_read() {
        let live = doc(json!({"kind": "ConfigMap", "metadata": {"name": "x"}}));
        let applied = doc(json!({"kind": "ConfigMap", "metadata": {"name": "x"}, "data": {"a": "1"}}));
        let annotated = with_config_annotation(&live, KEY, &applied).unwrap();
        assert!(can_patch(&annotated, KEY));
        assert_eq!(current_config(&annotated, KEY).unwrap(), applied);
        assert!(live.metadata_annotations().is_none());
    }

    #[test]
    fn write_back_creates_metadata() {
        let annotated = with_config_annotation(&doc(json!({})), KEY, &doc(json!({"a": 1}))).unwrap();
        assert_eq!(annotated.dig_str(&["metadata", "annotations", KEY]), Some(r#"{"a":1}"#));
    }

    #[test]
    fn write_back_rejects_scalar_metadata() {
        let result = with_config_annotation(&doc(json!({"metadata": "x"})), KEY, &Document::mapping());
        assert!(matches!(result, Err(DocumentError::InvalidShape(_))));
    }

    #[test]
    fn default_annotation_key() {
        assert_eq!(
            DEFAULT_CONFIG_ANNOTATION,
            "kubectl.kubernetes.io/last-applied-configuration"
        );
    }
}
