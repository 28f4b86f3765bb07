//! Discovery of image files in a folder.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::IMAGE_EXTENSIONS;
use crate::model::ImageId;

/// Errors that can occur while listing a folder.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The folder could not be read
    #[error("Failed to read folder {folder:?}: {source}")]
    ReadFolder {
        /// Folder that was being listed
        folder: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Check if a path has a supported image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the images directly inside `folder`, sorted by path.
///
/// Subfolders are not scanned. An existing folder without images yields an
/// empty list.
pub fn discover_images(folder: &Path) -> Result<Vec<ImageId>, ScanError> {
    let entries = std::fs::read_dir(folder).map_err(|source| ScanError::ReadFolder {
        folder: folder.to_path_buf(),
        source,
    })?;

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();

    // Sort by filename for consistent ordering
    images.sort();

    log::info!("Scanned folder {:?}: found {} images", folder, images.len());
    Ok(images.into_iter().map(ImageId::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.png")));
        assert!(is_image_file(Path::new("b.JPG")));
        assert!(is_image_file(Path::new("c.jpeg")));
        assert!(!is_image_file(Path::new("a.txt")));
        assert!(!is_image_file(Path::new("noext")));
    }

    #[test]
    fn test_discover_images_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.png", "a.jpg", "a.txt", "notes.md"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let images = discover_images(dir.path()).unwrap();
        assert_eq!(
            images,
            vec![
                ImageId::new(dir.path().join("a.jpg")),
                ImageId::new(dir.path().join("b.png")),
            ]
        );
    }

    #[test]
    fn test_missing_folder_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            discover_images(&dir.path().join("missing")),
            Err(ScanError::ReadFolder { .. })
        ));
    }
}
