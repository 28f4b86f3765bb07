//! Global constants for the captag engine

/// Extension of the sidecar caption file written next to each image
pub const CAPTION_EXTENSION: &str = "txt";

/// Separator used when writing a caption file
pub const CAPTION_SEPARATOR: &str = ", ";

/// Supported image extensions for folder discovery
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Default number of columns in the gallery grid
pub const DEFAULT_GRID_COLUMNS: usize = 3;

/// Name of the pseudo scheme that disables color coding
pub const NO_SCHEME: &str = "None";

/// Default directory scanned for classification schemes
pub const DEFAULT_SCHEME_DIR: &str = "tags";

/// Color used for tags the active scheme does not know
pub const UNCLASSIFIED_COLOR: &str = "black";
