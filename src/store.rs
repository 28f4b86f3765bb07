//! Authoritative image -> tag list mapping.
//!
//! Every mutation goes through [`TagStore`] and is written to the caption
//! store before the call returns. A failed write leaves the in-memory edit in
//! place and is reported through [`TagError::WriteFailed`] so the caller can
//! surface it and offer [`TagStore::retry_write`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::caption::CaptionStore;
use crate::classifier::Classifier;
use crate::error::{TagError, WriteFailure};
use crate::model::{ImageId, normalize_tag, parse_tag_list};

/// Which images a bulk tag operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Only the target image
    #[default]
    Single,
    /// Every image in the current visible set
    Visible,
    /// Every image in the store
    All,
}

/// Images whose tags were changed (and written) by an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Changed images, in the order they were processed
    pub changed: Vec<ImageId>,
}

impl MutationOutcome {
    /// Whether the operation changed anything.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Number of images carrying each normalized tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyIndex {
    counts: HashMap<String, usize>,
}

impl FrequencyIndex {
    /// Count for a tag (normalized before lookup), 0 if unseen.
    pub fn get(&self, tag: &str) -> usize {
        self.counts.get(&normalize_tag(tag)).copied().unwrap_or(0)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no image has any tag.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Tags ordered by descending count, ties broken alphabetically.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(tag, count)| (tag.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// In-memory tag lists for every image of the session, in listing order.
pub struct TagStore {
    order: Vec<ImageId>,
    tags: HashMap<ImageId, Vec<String>>,
    captions: Arc<dyn CaptionStore>,
}

impl std::fmt::Debug for TagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagStore")
            .field("images", &self.order.len())
            .finish()
    }
}

impl TagStore {
    /// Create an empty store backed by `captions`.
    pub fn new(captions: Arc<dyn CaptionStore>) -> Self {
        Self {
            order: Vec::new(),
            tags: HashMap::new(),
            captions,
        }
    }

    /// Caption backend of this store.
    pub fn captions(&self) -> &Arc<dyn CaptionStore> {
        &self.captions
    }

    /// Insert or replace an image's tags without writing them.
    ///
    /// New images are appended to the listing order; existing ones keep
    /// their position.
    pub fn insert(&mut self, image: ImageId, tags: Vec<String>) {
        if !self.tags.contains_key(&image) {
            self.order.push(image.clone());
        }
        self.tags.insert(image, tags);
    }

    /// Read an image's caption and insert it.
    pub fn load_image(&mut self, image: ImageId) -> std::io::Result<()> {
        let tags = self.captions.read(&image)?;
        self.insert(image, tags);
        Ok(())
    }

    /// Drop an image from memory only. Returns whether it was present.
    pub fn remove(&mut self, image: &ImageId) -> bool {
        if self.tags.remove(image).is_none() {
            return false;
        }
        self.order.retain(|id| id != image);
        true
    }

    /// Delete an image together with its files.
    ///
    /// The entry stays in memory if the files cannot be removed. Unknown
    /// images are a no-op.
    pub fn delete(&mut self, image: &ImageId) -> Result<bool, TagError> {
        if !self.contains(image) {
            return Ok(false);
        }
        self.captions
            .remove(image)
            .map_err(|source| TagError::DeleteFailed {
                path: image.path().to_path_buf(),
                source,
            })?;
        log::info!("Deleted image {}", image);
        Ok(self.remove(image))
    }

    /// Forget every image.
    pub fn clear(&mut self) {
        self.order.clear();
        self.tags.clear();
    }

    /// Whether the image is known.
    pub fn contains(&self, image: &ImageId) -> bool {
        self.tags.contains_key(image)
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the store holds no images.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Image ids in listing order.
    pub fn ids(&self) -> &[ImageId] {
        &self.order
    }

    /// Images and their tags in listing order.
    pub fn iter(&self) -> impl Iterator<Item = (&ImageId, &[String])> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.tags.get(id).map(|tags| (id, tags.as_slice())))
    }

    /// Current tags of an image; empty for unknown images.
    pub fn get_tags(&self, image: &ImageId) -> &[String] {
        self.tags.get(image).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recount how many images carry each normalized tag.
    pub fn frequency(&self) -> FrequencyIndex {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for tags in self.tags.values() {
            let unique: HashSet<String> = tags.iter().map(|t| normalize_tag(t)).collect();
            for tag in unique {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        FrequencyIndex { counts }
    }

    /// Resolve a scope into the affected known images.
    pub fn resolve(
        &self,
        target: Option<&ImageId>,
        scope: Scope,
        visible: &[ImageId],
    ) -> Vec<ImageId> {
        match scope {
            Scope::Single => target
                .filter(|id| self.contains(id))
                .cloned()
                .into_iter()
                .collect(),
            Scope::Visible => visible
                .iter()
                .filter(|id| self.contains(id))
                .cloned()
                .collect(),
            Scope::All => self.order.clone(),
        }
    }

    /// Append tags that are not yet present.
    ///
    /// Entries are split on commas like caption text, so `"red, blue"` adds
    /// two tags. Blank tags are ignored and existing order is kept.
    pub fn add_tags(
        &mut self,
        target: Option<&ImageId>,
        tags: &[String],
        scope: Scope,
        visible: &[ImageId],
    ) -> Result<MutationOutcome, TagError> {
        let new_tags: Vec<String> = tags.iter().flat_map(|t| parse_tag_list(t)).collect();
        let targets = self.resolve(target, scope, visible);

        self.mutate(targets, |current| {
            let mut updated = current.to_vec();
            for tag in &new_tags {
                if !updated.contains(tag) {
                    updated.push(tag.clone());
                }
            }
            updated
        })
    }

    /// Remove every occurrence of each named tag.
    pub fn remove_tags(
        &mut self,
        target: Option<&ImageId>,
        tags: &[String],
        scope: Scope,
        visible: &[ImageId],
    ) -> Result<MutationOutcome, TagError> {
        let doomed: HashSet<&str> = tags.iter().map(|t| t.trim()).collect();
        let targets = self.resolve(target, scope, visible);

        self.mutate(targets, |current| {
            current
                .iter()
                .filter(|t| !doomed.contains(t.as_str()))
                .cloned()
                .collect()
        })
    }

    /// Reduce each affected list to unique tags.
    ///
    /// The first occurrence of each tag is kept, so the relative order of the
    /// surviving tags is unchanged.
    pub fn dedupe(
        &mut self,
        target: Option<&ImageId>,
        scope: Scope,
        visible: &[ImageId],
    ) -> Result<MutationOutcome, TagError> {
        let targets = self.resolve(target, scope, visible);

        self.mutate(targets, |current| {
            let mut seen = HashSet::new();
            current
                .iter()
                .filter(|t| seen.insert(t.as_str()))
                .cloned()
                .collect()
        })
    }

    /// Reorder each affected list with the classifier.
    pub fn sort(
        &mut self,
        target: Option<&ImageId>,
        scope: Scope,
        visible: &[ImageId],
        classifier: &Classifier,
    ) -> Result<MutationOutcome, TagError> {
        let targets = self.resolve(target, scope, visible);
        self.mutate(targets, |current| classifier.sort(current))
    }

    /// Replace every occurrence of `from` with `to` on one image.
    ///
    /// `to` is split on commas like caption text. Replacement tags already
    /// present elsewhere in the list are not duplicated. Renaming a tag to
    /// itself leaves the list untouched.
    pub fn rename_tag(
        &mut self,
        image: &ImageId,
        from: &str,
        to: &str,
    ) -> Result<MutationOutcome, TagError> {
        let replacement = parse_tag_list(to);
        if replacement.is_empty() || (replacement.len() == 1 && replacement[0] == from) {
            return Ok(MutationOutcome::default());
        }
        let targets = self.resolve(Some(image), Scope::Single, &[]);

        self.mutate(targets, |current| {
            let mut updated: Vec<String> = Vec::with_capacity(current.len());
            for tag in current {
                if tag != from {
                    updated.push(tag.clone());
                    continue;
                }
                for new_tag in &replacement {
                    let elsewhere = current.iter().any(|t| t != from && t == new_tag);
                    if !elsewhere && !updated.contains(new_tag) {
                        updated.push(new_tag.clone());
                    }
                }
            }
            updated
        })
    }

    /// Rewrite the underscores of one tag as spaces on one image.
    pub fn replace_underscores(
        &mut self,
        image: &ImageId,
        tag: &str,
    ) -> Result<MutationOutcome, TagError> {
        let spaced = tag.replace('_', " ");
        self.rename_tag(image, tag, &spaced)
    }

    /// Write an image's current in-memory tags again.
    pub fn retry_write(&self, image: &ImageId) -> Result<(), TagError> {
        let Some(tags) = self.tags.get(image) else {
            return Ok(());
        };
        self.captions.write(image, tags).map_err(|source| {
            TagError::WriteFailed {
                changed: Vec::new(),
                failures: vec![WriteFailure {
                    image: image.clone(),
                    path: self.captions.caption_path(image),
                    source,
                }],
            }
        })
    }

    /// Apply `edit` to each target, writing only the lists that changed.
    fn mutate<F>(&mut self, targets: Vec<ImageId>, mut edit: F) -> Result<MutationOutcome, TagError>
    where
        F: FnMut(&[String]) -> Vec<String>,
    {
        let mut changed = Vec::new();
        let mut failures = Vec::new();

        for image in targets {
            let Some(current) = self.tags.get_mut(&image) else {
                continue;
            };
            let updated = edit(current);
            if updated == *current {
                continue;
            }
            *current = updated;

            if let Err(source) = self.captions.write(&image, current.as_slice()) {
                let path = self.captions.caption_path(&image);
                log::warn!("Failed to write caption {:?}: {}", path, source);
                failures.push(WriteFailure {
                    image: image.clone(),
                    path,
                    source,
                });
            }
            changed.push(image);
        }

        if failures.is_empty() {
            Ok(MutationOutcome { changed })
        } else {
            Err(TagError::WriteFailed { changed, failures })
        }
    }
}
