//! Hierarchical (YAML) scheme format.
//!
//! The file is a list of categories. Each category holds groups, and each
//! group has a CSS `rgba(...)` color and a list of tags:
//!
//! ```yaml
//! - name: Body
//!   groups:
//!     - name: Hair
//!       color: rgba(255, 171, 16, 1)
//!       tags: [long_hair, short_hair]
//! ```
//!
//! A tag's category is the position of its group, `Group { category, group }`.

use serde::Deserialize;
use serde_yaml::Value;

use super::{ClassificationScheme, SchemeEntry, SchemeError, SchemeLoad, SchemeWarning};
use crate::color_utils::rgba_to_hex;
use crate::model::TagCategory;

/// Color used when a group has no `color` key.
const DEFAULT_GROUP_COLOR: &str = "rgba(0, 0, 0, 1)";

#[derive(Debug, Deserialize)]
struct CategoryDoc {
    #[serde(default)]
    groups: Vec<GroupDoc>,
}

#[derive(Debug, Deserialize)]
struct GroupDoc {
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    tags: Vec<Value>,
}

/// Parse hierarchical scheme content.
///
/// Invalid YAML or a top level that is not a list of categories fails the
/// whole load. A bad group color or a non-scalar tag is skipped with a
/// warning.
pub fn parse(name: &str, content: &str) -> Result<SchemeLoad, SchemeError> {
    let mut scheme = ClassificationScheme::new(name);
    let mut warnings = Vec::new();

    if content.trim().is_empty() {
        return Ok(SchemeLoad { scheme, warnings });
    }

    let categories: Vec<CategoryDoc> = serde_yaml::from_str(content)?;

    for (category_idx, category) in categories.iter().enumerate() {
        for (group_idx, group) in category.groups.iter().enumerate() {
            let rgba = group.color.as_deref().unwrap_or(DEFAULT_GROUP_COLOR);
            let Some(color) = rgba_to_hex(rgba) else {
                warnings.push(SchemeWarning::at(
                    category_idx + 1,
                    format!(
                        "group {} has unparsable color '{}', skipped",
                        group_idx + 1,
                        rgba
                    ),
                ));
                continue;
            };

            let entry = SchemeEntry::new(
                TagCategory::Group {
                    category: category_idx,
                    group: group_idx,
                },
                color,
            );

            for tag in &group.tags {
                match scalar_text(tag) {
                    Some(text) => scheme.insert(&text, entry.clone()),
                    None => warnings.push(SchemeWarning::at(
                        category_idx + 1,
                        format!("group {} contains a non-text tag, skipped", group_idx + 1),
                    )),
                }
            }
        }
    }

    Ok(SchemeLoad { scheme, warnings })
}

/// Tags like `1990s` or `2b` can come back from YAML as numbers.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
- name: Body
  groups:
    - name: Hair
      color: rgba(255, 171, 16, 1)
      tags:
        - long_hair
        - short_hair
    - name: Eyes
      color: "rgba(0, 128, 255, 0.5)"
      tags: [blue_eyes]
- name: Scene
  groups:
    - name: Place
      tags: [outdoors, 1990]
"#;

    #[test]
    fn test_parse_groups_and_colors() {
        let load = parse("sample", SAMPLE).unwrap();
        let scheme = &load.scheme;

        assert!(load.warnings.is_empty());
        assert_eq!(scheme.len(), 5);
        assert_eq!(scheme.color("long hair"), Some("#ffab10"));
        assert_eq!(scheme.color("blue_eyes"), Some("#0080ff"));
        assert_eq!(
            scheme.get("blue eyes").unwrap().category,
            TagCategory::Group {
                category: 0,
                group: 1
            }
        );
    }

    #[test]
    fn test_missing_color_defaults_to_black() {
        let load = parse("sample", SAMPLE).unwrap();
        assert_eq!(load.scheme.color("outdoors"), Some("#000000"));
        assert_eq!(load.scheme.color("1990"), Some("#000000"));
    }

    #[test]
    fn test_later_group_overrides_earlier() {
        let yaml = r#"
- groups:
    - color: rgba(255, 0, 0, 1)
      tags: [fox]
- groups:
    - color: rgba(0, 0, 255, 1)
      tags: [fox]
"#;
        let load = parse("merge", yaml).unwrap();
        assert_eq!(load.scheme.color("fox"), Some("#0000ff"));
        assert_eq!(
            load.scheme.get("fox").unwrap().category,
            TagCategory::Group {
                category: 1,
                group: 0
            }
        );
    }

    #[test]
    fn test_bad_color_skips_group_with_warning() {
        let yaml = r#"
- groups:
    - color: not-a-color
      tags: [a]
    - color: rgba(1, 2, 3, 1)
      tags: [b]
"#;
        let load = parse("bad", yaml).unwrap();
        assert_eq!(load.warnings.len(), 1);
        assert!(!load.scheme.contains("a"));
        assert!(load.scheme.contains("b"));
    }

    #[test]
    fn test_invalid_yaml_fails() {
        assert!(matches!(
            parse("bad", "key: [unclosed"),
            Err(SchemeError::Yaml(_))
        ));
        assert!(matches!(
            parse("bad", "just: a map"),
            Err(SchemeError::Yaml(_))
        ));
    }

    #[test]
    fn test_empty_file_is_empty_scheme() {
        let load = parse("empty", "  \n").unwrap();
        assert!(load.scheme.is_empty());
    }
}
