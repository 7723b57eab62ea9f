//! Canonical text form and document ordering
//!
//! The canonical form is compact JSON with mapping keys sorted by byte
//! order. It feeds [`crate::Fingerprint`] and the total order over
//! documents; it is not meant as an interchange format.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

use crate::value::{Document, Scalar};

/// Canonical form of `doc`
#[must_use]
pub fn canonical_form(doc: &Document) -> String {
    let mut out = String::new();
    write_json(doc, &mut out, true);
    out
}

/// Compact JSON of `doc` with keys in insertion order
#[must_use]
pub fn to_compact_json(doc: &Document) -> String {
    let mut out = String::new();
    write_json(doc, &mut out, false);
    out
}

/// Sort documents by canonical form
///
/// Stable, so equal documents keep their relative order.
pub fn sort_documents(docs: &mut [Document]) {
    docs.sort_by_cached_key(canonical_form);
}

fn write_json(doc: &Document, out: &mut String, sorted: bool) {
    match doc {
        Document::Mapping(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            if sorted {
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            }
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_json(value, out, sorted);
            }
            out.push('}');
        }
        Document::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json(item, out, sorted);
            }
            out.push(']');
        }
        Document::Scalar(Scalar::Null) => out.push_str("null"),
        Document::Scalar(Scalar::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
        Document::Scalar(Scalar::Number(n)) => {
            // -0.0 equals 0.0, so both must print alike
            if n.as_f64().is_some_and(|f| n.is_f64() && f.to_bits() << 1 == 0) {
                out.push_str("0.0");
                return;
            }
            let text = n.to_string();
            out.push_str(&text);
            // floats must never collide with integers of the same value
            if n.is_f64() && !text.contains(['.', 'e', 'E']) {
                out.push_str(".0");
            }
        }
        Document::Scalar(Scalar::String(s)) => write_string(s, out),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c < '\u{20}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Order of canonical forms; carries no meaning beyond determinism
impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_form(self).cmp(&canonical_form(other))
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical_form(self).hash(state);
    }
}
