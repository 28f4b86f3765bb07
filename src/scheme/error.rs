//! Error types for classification scheme loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort loading a whole scheme file.
///
/// Problems confined to a single row or group are not errors; they are
/// reported as [`SchemeWarning`](super::SchemeWarning)s and the load goes on.
#[derive(Error, Debug)]
pub enum SchemeError {
    /// I/O error while reading the scheme file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The hierarchical file is not valid YAML or has the wrong shape
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension is not a known scheme format
    #[error("Unsupported scheme file: {path:?}")]
    UnsupportedFormat {
        /// Path of the rejected file
        path: PathBuf,
    },

    /// No scheme with this name exists in the catalog
    #[error("Unknown color scheme '{name}'")]
    UnknownScheme {
        /// The requested name
        name: String,
    },
}

impl SchemeError {
    /// Create an unsupported format error.
    pub fn unsupported(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }
}
