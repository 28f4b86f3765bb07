//! Deterministic tag ordering driven by the active classification scheme.
//!
//! Tags are split into buckets that are concatenated in a fixed order:
//!
//! 1. `score_*` tags, descending string order
//! 2. `source_*` tags, ascending
//! 3. `by *` tags the scheme does not know (artist credits), ascending
//! 4. classified tags per category in [`CATEGORY_PRIORITY`] order, ascending
//! 5. everything else, ascending
//!
//! Score tags are compared as strings, so `score_9` sorts before `score_10`
//! only by accident of the digits involved.

use crate::constants::UNCLASSIFIED_COLOR;
use crate::model::{CATEGORY_PRIORITY, TagCategory};
use crate::scheme::ClassificationScheme;

const SCORE_PREFIX: &str = "score_";
const SOURCE_PREFIX: &str = "source_";
const BY_PREFIX: &str = "by ";

/// Sorts and colors tags using an optional classification scheme.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    scheme: Option<ClassificationScheme>,
}

impl Classifier {
    /// Create a classifier without a scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier using `scheme`.
    pub fn with_scheme(scheme: ClassificationScheme) -> Self {
        Self {
            scheme: Some(scheme),
        }
    }

    /// Replace the active scheme (`None` disables classification).
    pub fn set_scheme(&mut self, scheme: Option<ClassificationScheme>) {
        self.scheme = scheme;
    }

    /// The active scheme, if any.
    pub fn scheme(&self) -> Option<&ClassificationScheme> {
        self.scheme.as_ref()
    }

    /// Category of a tag under the active scheme.
    pub fn category(&self, tag: &str) -> Option<TagCategory> {
        self.scheme.as_ref()?.get(tag).map(|e| e.category)
    }

    /// Display color of a tag, black when unclassified.
    pub fn color(&self, tag: &str) -> &str {
        self.scheme
            .as_ref()
            .and_then(|s| s.color(tag))
            .unwrap_or(UNCLASSIFIED_COLOR)
    }

    fn is_classified(&self, tag: &str) -> bool {
        self.scheme.as_ref().is_some_and(|s| s.contains(tag))
    }

    /// Sort tags into the fixed bucket order.
    ///
    /// Sorting an already sorted list returns the same list.
    pub fn sort(&self, tags: &[String]) -> Vec<String> {
        let mut score = Vec::new();
        let mut source = Vec::new();
        let mut by = Vec::new();
        let mut categories: [Vec<String>; CATEGORY_PRIORITY.len()] = Default::default();
        let mut other = Vec::new();

        for tag in tags {
            if tag.starts_with(SCORE_PREFIX) {
                score.push(tag.clone());
            } else if tag.starts_with(SOURCE_PREFIX) {
                source.push(tag.clone());
            } else if tag.starts_with(BY_PREFIX) && !self.is_classified(tag) {
                by.push(tag.clone());
            } else {
                match self.category(tag).and_then(|c| c.priority()) {
                    Some(idx) => categories[idx].push(tag.clone()),
                    None => other.push(tag.clone()),
                }
            }
        }

        score.sort_by(|a, b| b.cmp(a));
        source.sort();
        by.sort();
        for bucket in categories.iter_mut() {
            bucket.sort();
        }
        other.sort();

        let mut sorted = Vec::with_capacity(tags.len());
        sorted.extend(score);
        sorted.extend(source);
        sorted.extend(by);
        for bucket in categories {
            sorted.extend(bucket);
        }
        sorted.extend(other);
        sorted
    }
}
