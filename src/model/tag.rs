//! Tag text helpers and tag categories.
//!
//! Tags are plain strings applied to entire images. Lookups against a
//! classification scheme go through [`normalize_tag`], which turns
//! underscores into spaces so `long_hair` and `long hair` share an entry.

/// Category a classification scheme assigns to a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagCategory {
    /// General descriptive tags
    General,
    /// Artist names
    Artist,
    /// Copyright / franchise tags
    Copyright,
    /// Character names
    Character,
    /// Metadata tags
    Meta,
    /// Species tags
    Species,
    /// Tags marked invalid by the dataset
    Invalid,
    /// Lore tags
    Lore,
    /// Position of a group inside a hierarchical scheme file
    Group {
        /// Index of the parent category in the file
        category: usize,
        /// Index of the group inside its category
        group: usize,
    },
    /// Known to the scheme but without a recognised category
    Other,
}

/// Sort priority of the categories that get their own bucket.
///
/// Anything not listed here, including unclassified tags, is sorted into a
/// trailing "other" bucket.
pub const CATEGORY_PRIORITY: [TagCategory; 4] = [
    TagCategory::Artist,
    TagCategory::Copyright,
    TagCategory::Character,
    TagCategory::General,
];

impl TagCategory {
    /// Position in [`CATEGORY_PRIORITY`], if the category has its own bucket.
    pub fn priority(&self) -> Option<usize> {
        CATEGORY_PRIORITY.iter().position(|c| c == self)
    }
}

/// Normalize a tag for scheme lookup and display.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', " ")
}

/// Split comma-separated text into trimmed, non-empty tags.
///
/// Used for caption file content as well as the add/remove/filter entry text.
pub fn parse_tag_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("long_hair"), "long hair");
        assert_eq!(normalize_tag(" blue_eyes "), "blue eyes");
        assert_eq!(normalize_tag("smile"), "smile");
    }

    #[test]
    fn test_parse_tag_list_drops_empty_pieces() {
        assert_eq!(parse_tag_list("a, b,c , ,"), vec!["a", "b", "c"]);
        assert!(parse_tag_list("").is_empty());
        assert!(parse_tag_list(" , ").is_empty());
    }

    #[test]
    fn test_category_priority() {
        assert_eq!(TagCategory::Artist.priority(), Some(0));
        assert_eq!(TagCategory::General.priority(), Some(3));
        assert_eq!(TagCategory::Meta.priority(), None);
        assert_eq!(
            TagCategory::Group {
                category: 0,
                group: 1
            }
            .priority(),
            None
        );
    }
}
