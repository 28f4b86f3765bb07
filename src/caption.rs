//! Sidecar caption persistence.
//!
//! Each image `photo.png` has its tags stored next to it in `photo.txt`,
//! joined by `", "`. A missing caption file means the image has no tags.
//! Writes always replace the whole file.

use std::io;
use std::path::{Path, PathBuf};

use crate::constants::{CAPTION_EXTENSION, CAPTION_SEPARATOR};
use crate::model::{ImageId, parse_tag_list};

/// Storage backend for per-image tag lists.
///
/// The session only talks to captions through this trait so the store can be
/// exercised without touching the filesystem.
pub trait CaptionStore: Send + Sync {
    /// Path of the caption file backing an image.
    fn caption_path(&self, image: &ImageId) -> PathBuf;

    /// Read the tags of an image. A missing caption is an empty list.
    fn read(&self, image: &ImageId) -> io::Result<Vec<String>>;

    /// Overwrite the caption of an image with `tags`.
    fn write(&self, image: &ImageId, tags: &[String]) -> io::Result<()>;

    /// Delete an image and its caption. Missing files are ignored.
    fn remove(&self, image: &ImageId) -> io::Result<()>;
}

/// Path of the sidecar caption for an image path.
///
/// The extension is replaced by `.txt`; an image without an extension gets
/// one appended.
pub fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension(CAPTION_EXTENSION)
}

/// Decode caption file content into tags.
///
/// Entries are trimmed and pieces that are empty after trimming (trailing
/// commas, `", ,"`) are dropped.
pub fn decode_caption(content: &str) -> Vec<String> {
    parse_tag_list(content)
}

/// Encode tags as caption file content.
pub fn encode_caption(tags: &[String]) -> String {
    tags.join(CAPTION_SEPARATOR)
}

/// Caption files stored next to the images on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarCaptions;

impl CaptionStore for SidecarCaptions {
    fn caption_path(&self, image: &ImageId) -> PathBuf {
        sidecar_path(image.path())
    }

    fn read(&self, image: &ImageId) -> io::Result<Vec<String>> {
        let path = self.caption_path(image);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(decode_caption(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn write(&self, image: &ImageId, tags: &[String]) -> io::Result<()> {
        let path = self.caption_path(image);
        std::fs::write(&path, encode_caption(tags))?;
        log::debug!("Wrote {} tag(s) to {:?}", tags.len(), path);
        Ok(())
    }

    fn remove(&self, image: &ImageId) -> io::Result<()> {
        // Caption first, so a failed removal leaves the image in place.
        for path in [self.caption_path(image), image.path().to_path_buf()] {
            match std::fs::remove_file(&path) {
                Ok(()) => log::debug!("Deleted {:?}", path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryCaptions;
