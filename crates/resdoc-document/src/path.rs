//! Document paths for addressing nodes
//!
//! Provides [`DocPath`], a sequence of mapping-key / sequence-index tokens.
//! The text form is a JSON Pointer (RFC 6901), which is also the wire form
//! used by patch operations.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A single step in a [`DocPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathToken {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl PathToken {
    /// Key form of this token
    ///
    /// Index tokens addressing a mapping are looked up by their digits.
    #[must_use]
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Key(key) => Cow::Borrowed(key),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    /// Index form of this token, if it has one
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(_) => None,
        }
    }

    /// `-`, the past-the-end position of a sequence
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::Key(key) if key == "-")
    }

    fn parse(raw: &str) -> Result<Self, PathError> {
        let unescaped = unescape(raw)?;
        let numeric = !unescaped.is_empty()
            && unescaped.bytes().all(|b| b.is_ascii_digit())
            && (unescaped == "0" || !unescaped.starts_with('0'));
        if numeric {
            if let Ok(index) = unescaped.parse() {
                return Ok(Self::Index(index));
            }
        }
        Ok(Self::Key(unescaped))
    }
}

impl Display for PathToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathToken {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathToken {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathToken {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Location of a node inside a document
///
/// # Examples
/// - `[]` → `""` (the document root)
/// - `["spec", "replicas"]` → `/spec/replicas`
/// - `["spec", "containers", 0]` → `/spec/containers/0`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DocPath(Vec<PathToken>);

impl DocPath {
    /// Create new path from tokens
    #[inline]
    #[must_use]
    pub fn new(tokens: Vec<PathToken>) -> Self {
        Self(tokens)
    }

    /// Path with a single key
    #[inline]
    #[must_use]
    pub fn single(key: impl Into<String>) -> Self {
        Self(vec![PathToken::Key(key.into())])
    }

    /// Build a path of keys
    #[must_use]
    pub fn from_keys(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| PathToken::from(*k)).collect())
    }

    /// Empty path (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path tokens
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[PathToken] {
        &self.0
    }

    /// Get number of tokens
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.split_last().map(|(_, parent)| Self(parent.to_vec()))
    }

    /// Last token and the tokens leading to it
    #[inline]
    #[must_use]
    pub fn split_last(&self) -> Option<(&PathToken, &[PathToken])> {
        self.0.split_last()
    }

    /// Get last token (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathToken> {
        self.0.last()
    }

    /// Append a token, returning new path
    #[must_use]
    pub fn child(&self, token: impl Into<PathToken>) -> Self {
        let mut new = self.clone();
        new.0.push(token.into());
        new
    }

    /// Append a mapping key, returning new path
    #[inline]
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        self.child(PathToken::Key(key.to_string()))
    }

    /// Append a sequence index, returning new path
    #[inline]
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(PathToken::Index(index))
    }

    /// Check if this path is a prefix of another
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Check if this path is a strict prefix of another
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Iterator over tokens from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathToken> {
        self.0.iter()
    }

    /// JSON Pointer text of this path
    #[inline]
    #[must_use]
    pub fn to_pointer(&self) -> String {
        self.to_string()
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "/{token}")?;
        }
        Ok(())
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathError::MissingLeadingSlash(s.to_string()));
        };
        rest.split('/')
            .map(PathToken::parse)
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl From<Vec<PathToken>> for DocPath {
    fn from(tokens: Vec<PathToken>) -> Self {
        Self(tokens)
    }
}

impl<'a> IntoIterator for &'a DocPath {
    type Item = &'a PathToken;
    type IntoIter = std::slice::Iter<'a, PathToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl serde::Serialize for DocPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DocPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pointer = <Cow<'de, str> as serde::Deserialize>::deserialize(deserializer)?;
        pointer.parse().map_err(serde::de::Error::custom)
    }
}

fn unescape(raw: &str) -> Result<String, PathError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PathError::InvalidEscape(raw.to_string())),
        }
    }
    Ok(out)
}

/// Errors related to document paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Non-empty pointer without a leading slash
    #[error("pointer '{0}' must be empty or start with '/'")]
    MissingLeadingSlash(String),

    /// `~` not followed by `0` or `1`
    #[error("invalid escape sequence in pointer token '{0}'")]
    InvalidEscape(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_root() {
        let path = DocPath::root();
        assert!(path.is_root());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn path_child_and_display() {
        let path = DocPath::root().key("spec").key("containers").index(0);
        assert_eq!(path.to_string(), "/spec/containers/0");
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn path_parent() {
        let path = DocPath::from_keys(&["a", "b", "c"]);
        assert_eq!(path.parent(), Some(DocPath::from_keys(&["a", "b"])));
        assert!(DocPath::root().parent().is_none());
    }

    #[test]
    fn path_escapes_special_characters() {
        let path = DocPath::root()
            .key("metadata")
            .key("annotations")
            .key("kubectl.kubernetes.io/last-applied-configuration");
        assert_eq!(
            path.to_pointer(),
            "/metadata/annotations/kubectl.kubernetes.io~1last-applied-configuration"
        );

        let tilde = DocPath::single("a~b");
        assert_eq!(tilde.to_string(), "/a~0b");
    }

    #[test]
    fn path_parse_roundtrips_escapes() {
        let parsed: DocPath = "/metadata/annotations/a~1b~0c".parse().unwrap();
        assert_eq!(parsed, DocPath::from_keys(&["metadata", "annotations", "a/b~c"]));
    }

    #[test]
    fn path_parse_numeric_tokens() {
        let parsed: DocPath = "/items/10/name".parse().unwrap();
        assert_eq!(
            parsed.tokens(),
            &[
                PathToken::Key("items".into()),
                PathToken::Index(10),
                PathToken::Key("name".into())
            ]
        );

        // Leading zeros are keys, not indexes
        let padded: DocPath = "/items/01".parse().unwrap();
        assert_eq!(padded.last(), Some(&PathToken::Key("01".into())));
    }

    #[test]
    fn path_parse_empty_is_root() {
        let parsed: DocPath = "".parse().unwrap();
        assert!(parsed.is_root());
    }

    #[test]
    fn path_parse_empty_key() {
        let parsed: DocPath = "/".parse().unwrap();
        assert_eq!(parsed.tokens(), &[PathToken::Key(String::new())]);
    }

    #[test]
    fn path_parse_requires_leading_slash() {
        let result: Result<DocPath, _> = "spec/replicas".parse();
        assert!(matches!(result, Err(PathError::MissingLeadingSlash(_))));
    }

    #[test]
    fn path_parse_rejects_bad_escape() {
        let result: Result<DocPath, _> = "/a~2".parse();
        assert!(matches!(result, Err(PathError::InvalidEscape(_))));
    }

    #[test]
    fn path_prefix_relations() {
        let parent = DocPath::from_keys(&["a"]);
        let child = DocPath::from_keys(&["a", "b"]);
        assert!(parent.is_prefix_of(&child));
        assert!(parent.is_ancestor_of(&child));
        assert!(!child.is_prefix_of(&parent));
        assert!(!parent.is_ancestor_of(&parent));
    }

    #[test]
    fn token_key_forms() {
        assert_eq!(PathToken::Index(3).as_key(), "3");
        assert_eq!(PathToken::Key("x".into()).as_index(), None);
        assert!(PathToken::from("-").is_end());
    }

    #[test]
    fn path_serde_as_pointer() {
        let path = DocPath::root().key("spec").index(2);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/spec/2\"");
        let back: DocPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
