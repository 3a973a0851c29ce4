//! Loaded configuration sources and their snapshots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::format::Format;
use crate::config::loader::{read_document, ConfigError};
use crate::config::settings::Settings;
use crate::config::value::{leaf_keys, lookup, Table, Value};

/// Immutable parsed contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Table,
}

impl Document {
    pub fn new(root: Table) -> Self {
        Self { root }
    }

    /// Borrow the value at `key` without cloning.
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.root, key).filter(|v| !v.is_null())
    }
}

impl Settings for Document {
    fn value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }

    fn all_keys(&self) -> Vec<String> {
        leaf_keys(&self.root)
    }
}

/// A named configuration file, loaded and queryable.
///
/// Reads go through the currently published [`Document`]. A watched source
/// has a single writer (its watcher task) that replaces the document on
/// reload; readers are never blocked. Reading several keys through
/// [`Settings`] on the source itself may straddle a reload, so callers that
/// need a consistent view take one [`snapshot`](Self::snapshot) and read
/// from it.
#[derive(Debug)]
pub struct ConfigSource {
    name: String,
    path: PathBuf,
    format: Format,
    current: ArcSwap<Document>,
}

impl ConfigSource {
    /// Read and parse `path`. Blocks on file IO.
    pub fn open(name: &str, path: &Path, format: Format) -> Result<Self, ConfigError> {
        let document = read_document(path, format)?;
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            format,
            current: ArcSwap::from_pointee(document),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The currently published document.
    pub fn snapshot(&self) -> Arc<Document> {
        self.current.load_full()
    }

    /// Re-read the backing file and publish the result.
    ///
    /// On failure the current document stays in place.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let document = read_document(&self.path, self.format)?;
        self.current.store(Arc::new(document));
        Ok(())
    }
}

impl Settings for ConfigSource {
    fn value(&self, key: &str) -> Option<Value> {
        self.current.load().get(key).cloned()
    }

    fn all_keys(&self) -> Vec<String> {
        self.current.load().all_keys()
    }
}
