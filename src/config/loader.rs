//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::format::{Format, SEARCH_EXTENSIONS};
use crate::config::settings::Settings;
use crate::config::source::{ConfigSource, Document};

/// Key in the machine configuration holding the search directories.
pub const SEARCH_PATH_KEY: &str = "configuration.path";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} as {format}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: Format,
        message: String,
    },

    #[error("unsupported configuration format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("configuration '{name}' not found in search path [{searched}]")]
    NotFound { name: String, searched: String },

    #[error("no machine configuration has been loaded")]
    NoPrimary,

    #[error("configuration load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ConfigError {
    /// Description without filesystem paths, fit for HTTP clients.
    pub fn summary(&self) -> String {
        match self {
            ConfigError::Io { .. } => "configuration file could not be read".to_string(),
            ConfigError::Parse { format, .. } => format!("configuration file is not valid {format}"),
            ConfigError::UnsupportedFormat { .. } => "unsupported configuration format".to_string(),
            ConfigError::NotFound { name, .. } => format!("configuration '{name}' not found"),
            ConfigError::NoPrimary | ConfigError::Join(_) => self.to_string(),
        }
    }
}

/// Read and parse a single file.
pub fn read_document(path: &Path, format: Format) -> Result<Document, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root = format.parse(&content).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        format,
        message,
    })?;
    Ok(Document::new(root))
}

/// Directories listed under `configuration.path`.
///
/// The value is comma-separated; entries are trimmed and empty ones skipped.
pub fn search_path(machine: &impl Settings) -> Vec<PathBuf> {
    machine
        .get_string(SEARCH_PATH_KEY)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Locate `name.<ext>` in the first directory that has it.
///
/// Directories are tried in order; within a directory, extensions follow
/// [`SEARCH_EXTENSIONS`].
pub fn find_in_search_path(name: &str, dirs: &[PathBuf]) -> Option<(PathBuf, Format)> {
    dirs.iter().find_map(|dir| {
        SEARCH_EXTENSIONS.iter().find_map(|ext| {
            let candidate = dir.join(format!("{name}.{ext}"));
            let format = Format::from_extension(ext)?;
            candidate.is_file().then_some((candidate, format))
        })
    })
}

/// Load a named source from the search path. Blocks on file IO.
pub fn load_named(name: &str, dirs: &[PathBuf]) -> Result<ConfigSource, ConfigError> {
    let (path, format) = find_in_search_path(name, dirs).ok_or_else(|| ConfigError::NotFound {
        name: name.to_string(),
        searched: dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    tracing::debug!(source = %name, path = %path.display(), %format, "Loading configuration");
    ConfigSource::open(name, &path, format)
}

/// Load the machine configuration from an exact path.
pub fn load_machine(name: &str, path: &Path) -> Result<ConfigSource, ConfigError> {
    let format = Format::for_machine_file(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    ConfigSource::open(name, path, format)
}
