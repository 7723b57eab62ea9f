//! Deep merge of documents
//!
//! Overlay wins. Mappings merge key by key; everything else (sequences,
//! scalars, explicit nulls, mismatched kinds) is replaced wholesale by the
//! overlay's value. Sequences are never merged element-wise.

use crate::value::Document;

/// Merge `overlay` onto `base`, returning a new document
///
/// Keys of `base` keep their order; keys only in `overlay` are appended in
/// overlay order.
#[must_use]
pub fn merge(base: &Document, overlay: &Document) -> Document {
    match (base, overlay) {
        (Document::Mapping(base_map), Document::Mapping(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_val) in overlay_map {
                let merged = match result.get(key) {
                    Some(base_val) => merge(base_val, overlay_val),
                    None => overlay_val.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Document::Mapping(result)
        }
        (_, overlay_val) => overlay_val.clone(),
    }
}

/// Merge `overlay` into `target` in place
pub fn merge_into(target: &mut Document, overlay: Document) {
    match (target, overlay) {
        (Document::Mapping(target_map), Document::Mapping(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, overlay_val),
                    None => {
                        target_map.insert(key, overlay_val);
                    }
                }
            }
        }
        (slot, overlay_val) => *slot = overlay_val,
    }
}

/// Fold layers left to right onto an empty mapping
#[must_use]
pub fn merge_all<I>(layers: I) -> Document
where
    I: IntoIterator<Item = Document>,
{
    layers.into_iter().fold(Document::mapping(), |mut acc, layer| {
        merge_into(&mut acc, layer);
        acc
    })
}
