//! Discovery of scheme files in a directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{ClassificationScheme, SchemeError, SchemeFormat, SchemeLoad};
use crate::constants::NO_SCHEME;

/// Available schemes, keyed by file stem.
///
/// The pseudo scheme [`NO_SCHEME`] is always listed and means "no color
/// coding".
#[derive(Debug, Clone, Default)]
pub struct SchemeCatalog {
    schemes: BTreeMap<String, PathBuf>,
}

impl SchemeCatalog {
    /// Scan a directory for `.yaml`, `.yml` and `.csv` files.
    ///
    /// A missing or unreadable directory yields an empty catalog.
    pub fn scan(dir: &Path) -> Self {
        let mut catalog = Self::default();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Color scheme directory {:?} not available: {}", dir, e);
                return catalog;
            }
        };

        for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
            if !path.is_file() || SchemeFormat::from_path(&path).is_none() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                catalog.schemes.insert(stem.to_string(), path.clone());
            }
        }

        log::info!(
            "Found {} color scheme(s) in {:?}",
            catalog.schemes.len(),
            dir
        );
        catalog
    }

    /// Register a scheme file under an explicit name.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.schemes.insert(name.into(), path.into());
    }

    /// All selectable names, starting with [`NO_SCHEME`].
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(NO_SCHEME)
            .chain(self.schemes.keys().map(String::as_str))
            .collect()
    }

    /// File backing a scheme name.
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.schemes.get(name).map(PathBuf::as_path)
    }

    /// Whether a name can be selected.
    pub fn contains(&self, name: &str) -> bool {
        name == NO_SCHEME || self.schemes.contains_key(name)
    }

    /// Load a scheme by name.
    ///
    /// Returns `Ok(None)` for [`NO_SCHEME`].
    pub fn load(&self, name: &str) -> Result<Option<SchemeLoad>, SchemeError> {
        if name == NO_SCHEME {
            return Ok(None);
        }
        let path = self.path(name).ok_or_else(|| SchemeError::UnknownScheme {
            name: name.to_string(),
        })?;
        ClassificationScheme::load(path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let catalog = SchemeCatalog::scan(&dir.path().join("nope"));
        assert_eq!(catalog.names(), vec![NO_SCHEME]);
    }

    #[test]
    fn test_scan_lists_scheme_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("danbooru.csv"), "a,0,0,\n").unwrap();
        std::fs::write(dir.path().join("groups.yaml"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let catalog = SchemeCatalog::scan(dir.path());
        assert_eq!(catalog.names(), vec![NO_SCHEME, "danbooru", "groups"]);
        assert!(catalog.contains("groups"));
        assert!(!catalog.contains("notes"));
    }

    #[test]
    fn test_load_by_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("danbooru.csv"), "cat,0,0,\n").unwrap();
        let catalog = SchemeCatalog::scan(dir.path());

        assert!(catalog.load(NO_SCHEME).unwrap().is_none());
        let load = catalog.load("danbooru").unwrap().unwrap();
        assert!(load.scheme.contains("cat"));
        assert!(matches!(
            catalog.load("missing"),
            Err(SchemeError::UnknownScheme { .. })
        ));
    }
}
