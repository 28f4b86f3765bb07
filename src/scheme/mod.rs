//! Classification schemes: named tables mapping tags to a category and color.
//!
//! Two file formats are supported:
//! - hierarchical YAML (`.yaml` / `.yml`), see [`hierarchical`]
//! - tabular CSV (`.csv`), see [`tabular`]
//!
//! Both produce the same flat table keyed by normalized tag. When a tag is
//! defined more than once, the later definition in file order wins.

mod catalog;
mod error;
pub mod hierarchical;
pub mod tabular;

pub use catalog::SchemeCatalog;
pub use error::SchemeError;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::model::{TagCategory, normalize_tag};

/// Category and color assigned to a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeEntry {
    /// Category used for sorting
    pub category: TagCategory,
    /// Display color, either a color name or a `#rrggbb` code
    pub color: String,
}

impl SchemeEntry {
    /// Create a new entry.
    pub fn new(category: TagCategory, color: impl Into<String>) -> Self {
        Self {
            category,
            color: color.into(),
        }
    }
}

/// A recoverable problem found while loading a scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeWarning {
    /// 1-based line (tabular) or category position (hierarchical), if known
    pub line: Option<usize>,
    /// Human-readable description
    pub message: String,
}

impl SchemeWarning {
    /// Create a warning attached to a line.
    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create a warning without location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// File formats a scheme can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeFormat {
    /// Categories containing colored groups of tags (YAML)
    Hierarchical,
    /// One row per tag with a palette group number (CSV)
    Tabular,
}

impl SchemeFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Hierarchical),
            "csv" => Some(Self::Tabular),
            _ => None,
        }
    }
}

/// Result of loading a scheme: the table plus any skipped rows.
#[derive(Debug, Clone)]
pub struct SchemeLoad {
    /// The loaded scheme
    pub scheme: ClassificationScheme,
    /// Rows or groups that were skipped
    pub warnings: Vec<SchemeWarning>,
}

/// A named normalized-tag -> category/color table.
#[derive(Debug, Clone, Default)]
pub struct ClassificationScheme {
    name: String,
    entries: HashMap<String, SchemeEntry>,
}

impl ClassificationScheme {
    /// Create an empty scheme.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Load a scheme file, picking the parser from its extension.
    ///
    /// The scheme is named after the file stem.
    pub fn load(path: &Path) -> Result<SchemeLoad, SchemeError> {
        let format = SchemeFormat::from_path(path).ok_or_else(|| SchemeError::unsupported(path))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;

        let load = match format {
            SchemeFormat::Hierarchical => hierarchical::parse(&name, &content)?,
            SchemeFormat::Tabular => tabular::parse(&name, &content),
        };

        for warning in &load.warnings {
            log::warn!("Color scheme {:?}: {}", path, warning);
        }
        log::info!(
            "Loaded color scheme '{}' with {} tags ({} warnings)",
            load.scheme.name,
            load.scheme.len(),
            load.warnings.len()
        );
        Ok(load)
    }

    /// Name of the scheme.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert an entry, replacing any earlier entry for the same normalized tag.
    pub fn insert(&mut self, tag: &str, entry: SchemeEntry) {
        let key = normalize_tag(tag);
        if key.is_empty() {
            return;
        }
        self.entries.insert(key, entry);
    }

    /// Look up a tag (normalized before lookup).
    pub fn get(&self, tag: &str) -> Option<&SchemeEntry> {
        self.entries.get(&normalize_tag(tag))
    }

    /// Whether the scheme defines a tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Display color of a tag, if classified.
    pub fn color(&self, tag: &str) -> Option<&str> {
        self.get(tag).map(|e| e.color.as_str())
    }

    /// Number of distinct normalized tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the scheme has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_is_normalized() {
        let mut scheme = ClassificationScheme::new("test");
        scheme.insert("long_hair", SchemeEntry::new(TagCategory::General, "lightblue"));

        assert!(scheme.contains("long hair"));
        assert!(scheme.contains("long_hair"));
        assert_eq!(scheme.color("long hair"), Some("lightblue"));
        assert_eq!(scheme.len(), 1);
    }

    #[test]
    fn test_insert_last_write_wins() {
        let mut scheme = ClassificationScheme::new("test");
        scheme.insert("fox", SchemeEntry::new(TagCategory::General, "red"));
        scheme.insert("fox", SchemeEntry::new(TagCategory::Artist, "blue"));

        let entry = scheme.get("fox").unwrap();
        assert_eq!(entry.color, "blue");
        assert_eq!(entry.category, TagCategory::Artist);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            SchemeFormat::from_path(Path::new("tags/danbooru.csv")),
            Some(SchemeFormat::Tabular)
        );
        assert_eq!(
            SchemeFormat::from_path(Path::new("tags/groups.YAML")),
            Some(SchemeFormat::Hierarchical)
        );
        assert_eq!(SchemeFormat::from_path(Path::new("tags/readme.md")), None);
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("danbooru.csv");
        std::fs::write(&csv_path, "hatsune_miku,4,100,\"miku\"\n").unwrap();

        let load = ClassificationScheme::load(&csv_path).unwrap();
        assert_eq!(load.scheme.name(), "danbooru");
        assert_eq!(load.scheme.color("hatsune miku"), Some("lightgreen"));
        assert_eq!(load.scheme.color("miku"), Some("lightgreen"));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scheme.txt");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            ClassificationScheme::load(&path),
            Err(SchemeError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ClassificationScheme::load(&dir.path().join("gone.csv")),
            Err(SchemeError::Io(_))
        ));
    }
}
