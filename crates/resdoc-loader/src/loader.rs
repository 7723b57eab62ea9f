//! File and directory loading
//!
//! [`Loader`] is the only component that touches the filesystem. Directory
//! loading is lazy: [`DocumentStream`] reads files only while it is being
//! iterated, and every call to [`DocumentStream::iter`] starts over.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resdoc_document::{Document, Resource};

use crate::error::{LoadError, LoadResult};
use crate::parsers::{default_parsers, DocumentParser, JsonParser, ParserRegistry};

/// Extensions picked up when walking a directory
pub const DIRECTORY_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Parser used for explicitly named files with an unregistered extension
pub const FALLBACK_EXTENSION: &str = "yaml";

/// Loader limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Maximum file size to parse (bytes)
    pub max_file_size: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl LoaderConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum file size
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }
}

/// Reads documents from strings, files and directory trees
#[derive(Debug, Clone, Default)]
pub struct Loader {
    parsers: Arc<ParserRegistry>,
    config: LoaderConfig,
}

impl Loader {
    /// Create loader with default parsers and limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create loader with custom limits
    #[must_use]
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            parsers: Arc::new(default_parsers()),
            config,
        }
    }

    /// Replace the parser registry
    #[must_use]
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = Arc::new(parsers);
        self
    }

    /// Active limits
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Parse a single JSON resource
    ///
    /// # Errors
    /// - `LoadError::Syntax` if the text is not one JSON value
    /// - `LoadError::Document` if the value is not an object
    pub fn from_json(&self, source: &str) -> LoadResult<Resource> {
        let origin = Path::new("<json>");
        let mut docs = JsonParser.parse(source, origin)?;
        if docs.len() != 1 {
            return Err(LoadError::syntax(
                origin,
                format!("expected exactly one JSON value, found {}", docs.len()),
            ));
        }
        let doc = docs.remove(0);
        Resource::new(doc).map_err(|e| LoadError::document(origin, e))
    }

    /// Load the first document of a file as a resource
    ///
    /// # Errors
    /// - `LoadError::Syntax` if the file holds no document
    /// - any error of [`Loader::read_file`]
    pub fn from_file(&self, path: impl AsRef<Path>) -> LoadResult<Resource> {
        let path = path.as_ref();
        let doc = self
            .read_file(path)?
            .into_iter()
            .next()
            .ok_or_else(|| LoadError::syntax(path, "file contains no documents"))?;
        Resource::new(doc).map_err(|e| LoadError::document(path, e))
    }

    /// Every document of a file, or of the YAML files under a directory
    #[must_use]
    pub fn from_files(&self, path: impl Into<PathBuf>) -> DocumentStream {
        DocumentStream {
            root: path.into(),
            loader: self.clone(),
        }
    }

    /// Read and parse every document of one file
    ///
    /// # Errors
    /// - `LoadError::NoParserForExtension` if neither the file's extension
    ///   nor [`FALLBACK_EXTENSION`] has a parser
    /// - `LoadError::TooLarge` if the file exceeds the size limit
    /// - `LoadError::Io` if reading fails
    /// - parser errors
    pub fn read_file(&self, path: &Path) -> LoadResult<Vec<Document>> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parser = match self.parsers.find_for_path(path) {
            Some(parser) => parser,
            None => {
                tracing::debug!(path = %path.display(), "unregistered extension, reading as YAML");
                self.parsers
                    .find_for_extension(FALLBACK_EXTENSION)
                    .ok_or_else(|| LoadError::NoParserForExtension(extension.to_string()))?
            }
        };

        let size = fs::metadata(path).map_err(|e| LoadError::io(path, e))?.len();
        if size > self.config.max_file_size {
            return Err(LoadError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: self.config.max_file_size,
            });
        }

        let content = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let docs = parser.parse(&content, path)?;
        tracing::debug!(path = %path.display(), documents = docs.len(), "loaded file");
        Ok(docs)
    }
}

/// Lazy, finite, restartable sequence of documents under a path
#[derive(Debug, Clone)]
pub struct DocumentStream {
    root: PathBuf,
    loader: Loader,
}

impl DocumentStream {
    /// Path the stream was created for
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Iterate from the beginning
    #[must_use]
    pub fn iter(&self) -> DocumentIter<'_> {
        DocumentIter {
            loader: &self.loader,
            pending: vec![self.root.clone()],
            current: None,
        }
    }

    /// Load everything, stopping at the first error
    ///
    /// # Errors
    /// Returns the first load error
    pub fn collect_documents(&self) -> LoadResult<Vec<Document>> {
        self.iter().map(|item| item.map(|(_, doc)| doc)).collect()
    }

    /// Load everything as resources, stopping at the first error
    ///
    /// # Errors
    /// Returns the first load error, or `LoadError::Document` for a
    /// document whose root is not a mapping
    pub fn collect_resources(&self) -> LoadResult<Vec<Resource>> {
        self.iter()
            .map(|item| {
                let (path, doc) = item?;
                Resource::new(doc).map_err(|e| LoadError::document(path, e))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a DocumentStream {
    type Item = LoadResult<(PathBuf, Document)>;
    type IntoIter = DocumentIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`DocumentStream`]
///
/// Yields each document with the file it came from. After an error the
/// iterator moves on to the next file.
#[derive(Debug)]
pub struct DocumentIter<'a> {
    loader: &'a Loader,
    // next paths to visit, last element first
    pending: Vec<PathBuf>,
    current: Option<(PathBuf, std::vec::IntoIter<Document>)>,
}

impl DocumentIter<'_> {
    fn expand(&mut self, path: PathBuf) -> LoadResult<Option<(PathBuf, Vec<Document>)>> {
        let metadata = fs::metadata(&path).map_err(|e| LoadError::io(&path, e))?;
        if !metadata.is_dir() {
            let docs = self.loader.read_file(&path)?;
            return Ok(Some((path, docs)));
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(&path).map_err(|e| LoadError::io(&path, e))? {
            let entry = entry.map_err(|e| LoadError::io(&path, e))?;
            let child = entry.path();
            if is_directory_candidate(&child) {
                children.push(child);
            } else {
                tracing::trace!(path = %child.display(), "skipping non-YAML entry");
            }
        }
        children.sort();
        tracing::debug!(path = %path.display(), entries = children.len(), "scanned directory");
        self.pending.extend(children.into_iter().rev());
        Ok(None)
    }
}

impl Iterator for DocumentIter<'_> {
    type Item = LoadResult<(PathBuf, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((path, docs)) = &mut self.current {
                if let Some(doc) = docs.next() {
                    return Some(Ok((path.clone(), doc)));
                }
                self.current = None;
            }

            let path = self.pending.pop()?;
            match self.expand(path) {
                Ok(Some((path, docs))) => self.current = Some((path, docs.into_iter())),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load entry");
                    return Some(Err(e));
                }
            }
        }
    }
}

/// `*.yml` / `*.yaml`, excluding hidden entries
fn is_directory_candidate(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(true, |n| n.starts_with('.'));
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DIRECTORY_EXTENSIONS.contains(&ext));
    !hidden && matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_limit() {
        assert_eq!(LoaderConfig::default().max_file_size, 10 * 1024 * 1024);
        assert_eq!(LoaderConfig::new().with_max_file_size(5).max_file_size, 5);
    }

    #[test]
    fn directory_candidates() {
        assert!(is_directory_candidate(Path::new("dir/a.yaml")));
        assert!(is_directory_candidate(Path::new("dir/b.yml")));
        assert!(is_directory_candidate(Path::new("dir/nested.yaml")));
        assert!(!is_directory_candidate(Path::new("dir/c.json")));
        assert!(!is_directory_candidate(Path::new("dir/.hidden.yaml")));
        assert!(!is_directory_candidate(Path::new("dir/README")));
    }

    #[test]
    fn from_json_single_object() {
        let resource = Loader::new().from_json(r#"{"kind": "Pod"}"#).unwrap();
        assert_eq!(resource.kind(), Some("Pod"));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let err = Loader::new().from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, LoadError::Document { .. }));
    }

    #[test]
    fn from_json_rejects_multiple_values() {
        let err = Loader::new().from_json("{} {}").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
    }
}
