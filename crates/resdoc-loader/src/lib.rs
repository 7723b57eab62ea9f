//! resdoc loader
//!
//! Reads documents from JSON and YAML text, files and directory trees, and
//! writes them back out. The document engine itself never touches bytes.
//!
//! # Example
//!
//! ```rust,ignore
//! use resdoc_loader::Loader;
//!
//! let loader = Loader::new();
//! for item in &loader.from_files("manifests/") {
//!     let (path, doc) = item?;
//!     println!("{}: {}", path.display(), doc);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod loader;
pub mod parsers;
mod serializer;

pub use error::{LoadError, LoadResult, SerializeError};
pub use loader::{
    DocumentIter, DocumentStream, Loader, LoaderConfig, DIRECTORY_EXTENSIONS, FALLBACK_EXTENSION,
};
pub use parsers::{default_parsers, DocumentParser, JsonParser, ParserRegistry, YamlParser};
pub use serializer::{to_json, to_json_pretty, to_yaml, to_yaml_stream, Format};
