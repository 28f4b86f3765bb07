//! Stable identity for images in a session.

use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of an image, keyed by its path on disk.
///
/// The view layer keeps its own widget association; the engine only ever
/// sees this key, so a widget rebuilt after a reload still maps to the same
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(PathBuf);

impl ImageId {
    /// Create an id from an image path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Path of the image file.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl From<PathBuf> for ImageId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for ImageId {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&str> for ImageId {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

impl AsRef<Path> for ImageId {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_compare_by_path() {
        let a = ImageId::from("/data/a.png");
        let b = ImageId::new(PathBuf::from("/data/a.png"));
        assert_eq!(a, b);
        assert_ne!(a, ImageId::from("/data/b.png"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(ImageId::from("/data/cat.jpg").file_name(), "cat.jpg");
    }
}
