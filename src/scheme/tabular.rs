//! Tabular (CSV) scheme format.
//!
//! Each row is `tag,group_number,post_count,"alt1,alt2"`. The third column is
//! ignored. The group number indexes a built-in palette chosen from the
//! scheme name, and the alternate names share the row's color.

use csv::ReaderBuilder;

use super::{ClassificationScheme, SchemeEntry, SchemeLoad, SchemeWarning};
use crate::constants::UNCLASSIFIED_COLOR;
use crate::model::TagCategory;

/// Number of columns a row must have.
const COLUMNS: usize = 4;

/// Built-in palettes for the two known tag datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Danbooru tag groups
    Danbooru,
    /// e621 tag groups
    E621,
}

impl Palette {
    /// Pick the palette from a scheme or file name.
    ///
    /// Names mentioning `danbooru` use the Danbooru palette, everything else
    /// uses e621.
    pub fn for_source(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("danbooru") {
            Palette::Danbooru
        } else {
            Palette::E621
        }
    }

    /// Color and category of a group number, if the palette defines it.
    pub fn lookup(&self, group: i32) -> Option<(&'static str, TagCategory)> {
        let found = match (self, group) {
            (_, -1) => ("red", TagCategory::Other),
            (_, 0) => ("lightblue", TagCategory::General),
            (Palette::Danbooru, 1) => ("indianred", TagCategory::Artist),
            (Palette::E621, 1) => ("gold", TagCategory::Artist),
            (_, 3) => ("violet", TagCategory::Copyright),
            (_, 4) => ("lightgreen", TagCategory::Character),
            (Palette::Danbooru, 5) => ("orange", TagCategory::Meta),
            (Palette::E621, 5) => ("tomato", TagCategory::Species),
            (Palette::E621, 6) => ("red", TagCategory::Invalid),
            (Palette::E621, 7) => ("whitesmoke", TagCategory::Meta),
            (Palette::E621, 8) => ("seagreen", TagCategory::Lore),
            _ => return None,
        };
        Some(found)
    }

    /// Entry for a raw group column, falling back to black / `Other`.
    fn entry(&self, group: &str) -> SchemeEntry {
        let (color, category) = group
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|g| self.lookup(g))
            .unwrap_or((UNCLASSIFIED_COLOR, TagCategory::Other));
        SchemeEntry::new(category, color)
    }
}

/// Parse tabular scheme content.
///
/// Rows with the wrong number of columns or that cannot be decoded are
/// skipped with a warning; the rest of the file still loads.
pub fn parse(name: &str, content: &str) -> SchemeLoad {
    let palette = Palette::for_source(name);
    let mut scheme = ClassificationScheme::new(name);
    let mut warnings = Vec::new();

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize);
                warnings.push(SchemeWarning {
                    line,
                    message: format!("unreadable row skipped: {}", e),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if record.len() != COLUMNS {
            warnings.push(SchemeWarning::at(
                line,
                format!(
                    "expected {} columns, found {}, row skipped",
                    COLUMNS,
                    record.len()
                ),
            ));
            continue;
        }

        let entry = palette.entry(&record[1]);
        scheme.insert(&record[0], entry.clone());

        let alt_tags = record[3].trim().trim_matches('"');
        for alt in alt_tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            scheme.insert(alt, entry.clone());
        }
    }

    SchemeLoad { scheme, warnings }
}
