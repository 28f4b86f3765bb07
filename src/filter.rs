//! Boolean tag filters and visible-set computation.
//!
//! A filter has a positive clause (tags the image should have) and a
//! negative clause (tags it should not have), each with its own combinator.
//! Everything here is a pure function of the supplied tags.

use std::collections::HashSet;

use crate::model::{ImageId, parse_tag_list};

/// How positive tags combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositiveMode {
    /// Every positive tag must be present (AND)
    #[default]
    All,
    /// At least one positive tag must be present (OR)
    Any,
}

/// How negative tags combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeMode {
    /// Every negative tag must be absent (AND-not)
    #[default]
    AllAbsent,
    /// At least one negative tag must be absent (OR-not)
    AnyAbsent,
}

/// Positive/negative tag predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    /// Tags the image should carry
    pub positive: Vec<String>,
    /// Combinator for `positive`
    pub positive_mode: PositiveMode,
    /// Tags the image should not carry
    pub negative: Vec<String>,
    /// Combinator for `negative`
    pub negative_mode: NegativeMode,
}

impl FilterSpec {
    /// An empty filter that matches every image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from the text of the positive and negative entries.
    pub fn from_text(positive: &str, negative: &str) -> Self {
        Self {
            positive: parse_tag_list(positive),
            negative: parse_tag_list(negative),
            ..Self::default()
        }
    }

    /// Set the positive tags.
    pub fn positive(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.positive = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the negative tags.
    pub fn negative(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.negative = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the positive combinator.
    pub fn positive_mode(mut self, mode: PositiveMode) -> Self {
        self.positive_mode = mode;
        self
    }

    /// Set the negative combinator.
    pub fn negative_mode(mut self, mode: NegativeMode) -> Self {
        self.negative_mode = mode;
        self
    }

    /// Append a tag to the positive clause unless it is already there.
    pub fn with_positive_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim();
        if !tag.is_empty() && !self.positive.iter().any(|t| t == tag) {
            self.positive.push(tag.to_string());
        }
        self
    }

    /// Remove a tag from both clauses.
    pub fn without_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim();
        self.positive.retain(|t| t != tag);
        self.negative.retain(|t| t != tag);
        self
    }

    /// Whether the filter has no tags in either clause.
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Positive clause as entry text (`"a, b"`).
    pub fn positive_text(&self) -> String {
        self.positive.join(", ")
    }

    /// Negative clause as entry text.
    pub fn negative_text(&self) -> String {
        self.negative.join(", ")
    }
}

/// Evaluate a filter against one image's tags.
pub fn matches(image_tags: &[String], spec: &FilterSpec) -> bool {
    let has = |tag: &String| image_tags.iter().any(|t| t == tag);

    let positive = spec.positive.is_empty()
        || match spec.positive_mode {
            PositiveMode::All => spec.positive.iter().all(has),
            PositiveMode::Any => spec.positive.iter().any(has),
        };

    let negative = spec.negative.is_empty()
        || match spec.negative_mode {
            NegativeMode::AllAbsent => spec.negative.iter().all(|t| !has(t)),
            NegativeMode::AnyAbsent => spec.negative.iter().any(|t| !has(t)),
        };

    positive && negative
}

/// Ids of the images matching `spec`, in input order.
pub fn compute_visible<'a, I>(images: I, spec: &FilterSpec) -> Vec<ImageId>
where
    I: IntoIterator<Item = (&'a ImageId, &'a [String])>,
{
    images
        .into_iter()
        .filter(|(_, tags)| matches(tags, spec))
        .map(|(id, _)| id.clone())
        .collect()
}

/// Tags present in every supplied tag list, in the order of the first list.
///
/// Returns an empty list when there are no images.
pub fn common_tags<'a, I>(tag_lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut lists = tag_lists.into_iter();
    let Some(first) = lists.next() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut common: Vec<String> = first
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect();
    for list in lists {
        common.retain(|tag| list.contains(tag));
        if common.is_empty() {
            break;
        }
    }
    common
}

/// Tags to show for an image when non-filtered tags are hidden.
///
/// With `hide_unfiltered` set, a tag is hidden if the positive clause is
/// non-empty and does not list it, or if the negative clause lists it.
pub fn display_tags<'a>(
    image_tags: &'a [String],
    spec: &FilterSpec,
    hide_unfiltered: bool,
) -> Vec<&'a str> {
    image_tags
        .iter()
        .filter(|tag| {
            if !hide_unfiltered {
                return true;
            }
            let hidden_by_positive = !spec.positive.is_empty() && !spec.positive.contains(*tag);
            let hidden_by_negative = !spec.negative.is_empty() && spec.negative.contains(*tag);
            !(hidden_by_positive || hidden_by_negative)
        })
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let spec = FilterSpec::new();
        assert!(matches(&[], &spec));
        assert!(matches(&tags(&["a", "b"]), &spec));
    }

    #[test]
    fn test_positive_all() {
        let spec = FilterSpec::new().positive(["a", "b"]);
        assert!(!matches(&tags(&["a"]), &spec));
        assert!(matches(&tags(&["a", "b"]), &spec));
        assert!(matches(&tags(&["b", "c", "a"]), &spec));
    }

    #[test]
    fn test_positive_any() {
        let spec = FilterSpec::new()
            .positive(["a", "b"])
            .positive_mode(PositiveMode::Any);
        assert!(matches(&tags(&["a"]), &spec));
        assert!(matches(&tags(&["b"]), &spec));
        assert!(!matches(&tags(&["c"]), &spec));
    }

    #[test]
    fn test_negative_all_absent() {
        let spec = FilterSpec::new().negative(["x"]);
        assert!(!matches(&tags(&["a", "x"]), &spec));
        assert!(matches(&tags(&["a"]), &spec));

        let spec = FilterSpec::new().negative(["x", "y"]);
        assert!(!matches(&tags(&["y"]), &spec));
    }

    #[test]
    fn test_negative_any_absent() {
        let spec = FilterSpec::new()
            .negative(["x", "y"])
            .negative_mode(NegativeMode::AnyAbsent);
        assert!(matches(&tags(&["x"]), &spec));
        assert!(!matches(&tags(&["x", "y"]), &spec));
        assert!(matches(&[], &spec));
    }

    #[test]
    fn test_clauses_combine_with_and() {
        let spec = FilterSpec::new().positive(["a"]).negative(["x"]);
        assert!(matches(&tags(&["a"]), &spec));
        assert!(!matches(&tags(&["a", "x"]), &spec));
        assert!(!matches(&tags(&["b"]), &spec));
    }

    #[test]
    fn test_compute_visible_preserves_order() {
        let ids: Vec<ImageId> = ["c.png", "a.png", "b.png"]
            .iter()
            .map(|p| ImageId::from(*p))
            .collect();
        let lists = [tags(&["cat"]), tags(&["dog"]), tags(&["cat", "dog"])];
        let spec = FilterSpec::new().positive(["cat"]);

        let visible = compute_visible(
            ids.iter().zip(lists.iter().map(Vec::as_slice)),
            &spec,
        );
        assert_eq!(visible, vec![ids[0].clone(), ids[2].clone()]);
    }

    #[test]
    fn test_from_text_parses_entries() {
        let spec = FilterSpec::from_text(" a, b ,, ", "x,y ");
        assert_eq!(spec.positive, tags(&["a", "b"]));
        assert_eq!(spec.negative, tags(&["x", "y"]));
        assert_eq!(spec.positive_text(), "a, b");
        assert_eq!(spec.negative_text(), "x, y");
    }

    #[test]
    fn test_with_positive_tag_skips_duplicates() {
        let spec = FilterSpec::new()
            .with_positive_tag("a")
            .with_positive_tag(" a ")
            .with_positive_tag("b");
        assert_eq!(spec.positive, tags(&["a", "b"]));
        let spec = spec.without_tag("a");
        assert_eq!(spec.positive, tags(&["b"]));
    }

    #[test]
    fn test_common_tags() {
        let lists = [tags(&["a", "b", "c", "a"]), tags(&["c", "a"]), tags(&["a", "c", "d"])];
        let common = common_tags(lists.iter().map(Vec::as_slice));
        assert_eq!(common, tags(&["a", "c"]));
        assert!(common_tags(std::iter::empty::<&[String]>()).is_empty());
    }

    #[test]
    fn test_display_tags_hides_unfiltered() {
        let image = tags(&["a", "b", "x"]);
        let spec = FilterSpec::new().positive(["a", "x"]).negative(["x"]);

        assert_eq!(display_tags(&image, &spec, false), vec!["a", "b", "x"]);
        assert_eq!(display_tags(&image, &spec, true), vec!["a"]);

        let only_negative = FilterSpec::new().negative(["b"]);
        assert_eq!(display_tags(&image, &only_negative, true), vec!["a", "x"]);
    }
}
