//! Subcommand implementations
//!
//! Each command returns the text to print so the binary stays a thin
//! argument-parsing shell.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use resdoc_document::{compute_patch, fingerprint, merge_all, sort_documents, Document, Resource};
use resdoc_loader::{Format, Loader};

use crate::config::ResdocConfig;

/// Runs subcommands against one configuration
#[derive(Debug, Clone)]
pub struct Runner {
    loader: Loader,
    annotation: String,
    output: Format,
}

impl Runner {
    /// Create runner from configuration
    #[must_use]
    pub fn new(config: &ResdocConfig) -> Self {
        Self {
            loader: Loader::with_config(config.loader_config()),
            annotation: config.annotation.clone(),
            output: config.output,
        }
    }

    /// Annotation key used for last-applied snapshots
    #[inline]
    #[must_use]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Deep merge the first document of each file, later files winning
    ///
    /// # Errors
    /// Fails if no files are given or any file cannot be loaded
    pub fn merge(&self, files: &[PathBuf]) -> Result<String> {
        if files.is_empty() {
            bail!("merge needs at least one file");
        }
        let layers = files
            .iter()
            .map(|path| self.load_resource(path).map(Resource::into_document))
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(layers = layers.len(), "merging documents");
        self.render(&merge_all(layers))
    }

    /// One `<fingerprint>  <label>` line per document under `path`
    ///
    /// # Errors
    /// Fails on the first document that cannot be loaded
    pub fn checksum(&self, path: &Path) -> Result<String> {
        let docs = self.load_all(path)?;
        let lines: Vec<String> = docs
            .into_iter()
            .enumerate()
            .map(|(index, doc)| {
                let digest = fingerprint(&doc);
                let label = Resource::new(doc).map_or_else(|_| format!("#{index}"), |r| r.to_string());
                format!("{digest}  {label}")
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// Patch taking a live document to the desired one
    ///
    /// Diffs against the last-applied snapshot annotated on `live`, or
    /// against `live` itself when `plain` is set.
    ///
    /// # Errors
    /// Fails if either file cannot be loaded or the annotation is malformed
    pub fn diff(&self, live: &Path, desired: &Path, plain: bool) -> Result<String> {
        let live = self.load_resource(live)?;
        let desired = self.load_resource(desired)?;

        let patch = if plain {
            compute_patch(live.document(), desired.document())
        } else {
            if !has_snapshot(&live, &self.annotation) {
                tracing::warn!(
                    resource = %live,
                    annotation = %self.annotation,
                    "no last-applied snapshot, diffing against an empty document"
                );
            }
            live.merge_patch_ops(desired.document(), &self.annotation)
                .with_context(|| format!("failed to read last-applied snapshot of {live}"))?
        };
        tracing::info!(ops = patch.len(), "computed patch");
        self.render(&Document::from(patch.to_json_value()))
    }

    /// Normalized last-applied snapshot of the first document in `file`
    ///
    /// # Errors
    /// Fails if the file cannot be loaded or the annotation is malformed
    pub fn current_config(&self, file: &Path) -> Result<String> {
        let resource = self.load_resource(file)?;
        let snapshot = resource
            .current_config(&self.annotation)
            .with_context(|| format!("failed to read last-applied snapshot of {resource}"))?;
        self.render(&snapshot)
    }

    /// Every document under `path` in canonical order
    ///
    /// # Errors
    /// Fails on the first document that cannot be loaded
    pub fn sort(&self, path: &Path) -> Result<String> {
        let mut docs = self.load_all(path)?;
        sort_documents(&mut docs);
        self.output
            .render_all(&docs)
            .context("failed to serialize documents")
    }

    fn load_resource(&self, path: &Path) -> Result<Resource> {
        self.loader
            .from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    fn load_all(&self, path: &Path) -> Result<Vec<Document>> {
        let docs = self
            .loader
            .from_files(path)
            .collect_documents()
            .with_context(|| format!("failed to load {}", path.display()))?;
        tracing::info!(path = %path.display(), documents = docs.len(), "loaded documents");
        Ok(docs)
    }

    fn render(&self, doc: &Document) -> Result<String> {
        self.output
            .render(doc)
            .context("failed to serialize document")
    }
}

/// Annotation present and non-null; malformed values still count
fn has_snapshot(resource: &Resource, annotation: &str) -> bool {
    resource
        .document()
        .metadata_annotations()
        .and_then(|annotations| annotations.get(annotation))
        .is_some_and(|value| !value.is_null())
}
