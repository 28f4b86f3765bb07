//! Error types for tag store operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ImageId;

/// A sidecar write that did not reach the disk.
#[derive(Debug, Error)]
#[error("failed to write caption {path:?} for {image}: {source}")]
pub struct WriteFailure {
    /// Image whose tags could not be persisted
    pub image: ImageId,
    /// Caption file that was being written
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

/// Errors that can occur while mutating tags.
#[derive(Debug, Error)]
pub enum TagError {
    /// One or more caption writes failed.
    ///
    /// The in-memory tags of every image in `changed` hold the edit even when
    /// its write failed, so the caller can retry.
    #[error("{} of {} caption file(s) could not be written", failures.len(), changed.len())]
    WriteFailed {
        /// Images whose tags changed in memory
        changed: Vec<ImageId>,
        /// Writes that failed
        failures: Vec<WriteFailure>,
    },

    /// Removing an image or its caption from disk failed
    #[error("failed to delete {path:?}: {source}")]
    DeleteFailed {
        /// File that could not be removed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl TagError {
    /// Images whose in-memory state was updated before the error surfaced.
    pub fn changed(&self) -> &[ImageId] {
        match self {
            TagError::WriteFailed { changed, .. } => changed,
            TagError::DeleteFailed { .. } => &[],
        }
    }

    /// Images whose caption file is out of date with memory.
    pub fn unsaved(&self) -> Vec<&ImageId> {
        match self {
            TagError::WriteFailed { failures, .. } => failures.iter().map(|f| &f.image).collect(),
            TagError::DeleteFailed { .. } => Vec::new(),
        }
    }
}
