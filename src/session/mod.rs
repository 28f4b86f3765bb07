//! The tagging session: one explicit value owning the tag store, classifier,
//! filter, and gallery selection.
//!
//! All commands the view layer can issue go through [`Session`]. After every
//! mutation the visible set is recomputed from the filter and the gallery is
//! notified, so observers never see a selection that points at a hidden or
//! deleted image. For use from several threads, wrap the session in a
//! [`SharedSession`].

mod shared;


pub use shared::{FolderScan, ScanOutcome, ScanToken, SharedSession};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::caption::CaptionStore;
use crate::classifier::Classifier;
use crate::config::AppSettings;
use crate::constants::NO_SCHEME;
use crate::error::TagError;
use crate::filter::{self, FilterSpec, PositiveMode};
use crate::gallery::{Direction, GalleryController, GalleryEvent, NavContext};
use crate::model::ImageId;
use crate::project::{ScanError, discover_images};
use crate::scheme::{SchemeCatalog, SchemeError, SchemeWarning};
use crate::store::{FrequencyIndex, MutationOutcome, Scope, TagStore};

/// A tag prepared for display next to the selected image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDisplay {
    /// Tag text as stored
    pub tag: String,
    /// Number of images carrying the tag
    pub count: usize,
    /// Color from the active scheme, black when unclassified
    pub color: String,
    /// Whether the tag is part of the positive filter
    pub in_filter: bool,
}

/// State of one tagging session.
#[derive(Debug)]
pub struct Session {
    store: TagStore,
    classifier: Classifier,
    catalog: SchemeCatalog,
    scheme_name: String,
    filter: FilterSpec,
    hide_unfiltered: bool,
    gallery: GalleryController,
    folder: Option<PathBuf>,
    settings: AppSettings,
    settings_path: Option<PathBuf>,
}

impl Session {
    /// Create an empty session using `captions` for persistence.
    pub fn new(captions: Arc<dyn CaptionStore>, settings: AppSettings) -> Self {
        Self {
            store: TagStore::new(captions),
            classifier: Classifier::new(),
            catalog: SchemeCatalog::default(),
            scheme_name: NO_SCHEME.to_string(),
            filter: FilterSpec::new(),
            hide_unfiltered: false,
            gallery: GalleryController::new(settings.columns),
            folder: None,
            settings,
            settings_path: None,
        }
    }

    /// Persist settings changes to `path`.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Use `catalog` as the list of selectable schemes.
    pub fn with_catalog(mut self, catalog: SchemeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Re-select the scheme remembered in the settings, if it still exists.
    ///
    /// A scheme that fails to load leaves the session without coloring.
    pub fn restore_scheme(&mut self) -> Result<Vec<SchemeWarning>, SchemeError> {
        let name = self.settings.last_color_scheme.clone();
        if name == NO_SCHEME || !self.catalog.contains(&name) {
            return Ok(Vec::new());
        }
        self.change_scheme(&name)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The tag store.
    pub fn store(&self) -> &TagStore {
        &self.store
    }

    /// The active classifier.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Selection and visible-set state.
    pub fn gallery(&self) -> &GalleryController {
        &self.gallery
    }

    /// Mutable gallery access, e.g. to subscribe observers or resize the grid.
    pub fn gallery_mut(&mut self) -> &mut GalleryController {
        &mut self.gallery
    }

    /// Current settings.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Folder currently loaded.
    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    /// Active filter.
    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Visible images in display order.
    pub fn visible(&self) -> &[ImageId] {
        self.gallery.visible()
    }

    /// Selected image.
    pub fn selected(&self) -> Option<&ImageId> {
        self.gallery.selected()
    }

    /// Tags of an image.
    pub fn get_tags(&self, image: &ImageId) -> &[String] {
        self.store.get_tags(image)
    }

    /// Per-tag image counts.
    pub fn frequency(&self) -> FrequencyIndex {
        self.store.frequency()
    }

    // ------------------------------------------------------------------
    // Folder loading
    // ------------------------------------------------------------------

    /// Load a folder synchronously, replacing the current images.
    ///
    /// Images whose caption cannot be read are skipped with a warning.
    pub fn open_folder(&mut self, folder: &Path) -> Result<usize, ScanError> {
        let images = discover_images(folder)?;
        let captions = self.store.captions().clone();
        let entries = shared::read_captions(captions.as_ref(), images, &|_: usize, _: usize| {});
        Ok(self.install_folder(folder, entries))
    }

    /// Replace the session contents with scanned entries.
    pub fn install_folder(&mut self, folder: &Path, entries: Vec<(ImageId, Vec<String>)>) -> usize {
        self.store.clear();
        for (image, tags) in entries {
            self.store.insert(image, tags);
        }
        self.folder = Some(folder.to_path_buf());
        self.gallery.clear_selection();
        self.refresh_visible();

        let count = self.store.len();
        log::info!("Loaded {} images from {:?}", count, folder);
        self.gallery.emit(GalleryEvent::FolderLoaded {
            folder: folder.to_path_buf(),
            images: count,
        });

        self.settings.last_opened_folder = Some(folder.display().to_string());
        self.save_settings();
        count
    }

    /// Add a single image (e.g. one created after the scan).
    pub fn add_image(&mut self, image: ImageId) -> std::io::Result<()> {
        self.store.load_image(image)?;
        self.refresh_visible();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Filtering and selection
    // ------------------------------------------------------------------

    /// Recompute the visible set from the filter.
    pub fn refresh_visible(&mut self) {
        let visible = filter::compute_visible(self.store.iter(), &self.filter);
        self.gallery.refresh_visible(visible);
    }

    /// Replace the filter and recompute visibility.
    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.filter = spec;
        self.refresh_visible();
    }

    /// Remove every filter tag, keeping the combinators.
    pub fn clear_filter(&mut self) {
        self.filter.positive.clear();
        self.filter.negative.clear();
        self.refresh_visible();
    }

    /// Append a clicked tag to the positive filter.
    pub fn add_tag_to_filter(&mut self, tag: &str) {
        let spec = std::mem::take(&mut self.filter).with_positive_tag(tag);
        self.set_filter(spec);
    }

    /// Remove a tag from both filter clauses.
    pub fn remove_tag_from_filter(&mut self, tag: &str) {
        let spec = std::mem::take(&mut self.filter).without_tag(tag);
        self.set_filter(spec);
    }

    /// Tags present on every image.
    pub fn common_tags(&self) -> Vec<String> {
        filter::common_tags(self.store.iter().map(|(_, tags)| tags))
    }

    /// Filter on the tags shared by every image (AND mode).
    pub fn apply_common_tags_filter(&mut self) {
        let common = self.common_tags();
        let spec = std::mem::take(&mut self.filter)
            .positive(common)
            .positive_mode(PositiveMode::All);
        self.set_filter(spec);
    }

    /// Hide tags that are not part of the filter in [`tag_display`](Self::tag_display).
    pub fn set_hide_unfiltered(&mut self, hide: bool) {
        self.hide_unfiltered = hide;
    }

    /// Select a visible image.
    pub fn select(&mut self, image: &ImageId) -> bool {
        self.gallery.select(image)
    }

    /// Arrow-key navigation; ignored while a text entry has focus.
    pub fn navigate(&mut self, context: NavContext, direction: Direction) -> Option<ImageId> {
        if !self.gallery.is_navigable(context) {
            return None;
        }
        let store = &self.store;
        self.gallery
            .move_selection_where(direction, |id| store.contains(id))
    }

    /// Tags of an image ready for display.
    pub fn tag_display(&self, image: &ImageId) -> Vec<TagDisplay> {
        let frequency = self.store.frequency();
        filter::display_tags(self.store.get_tags(image), &self.filter, self.hide_unfiltered)
            .into_iter()
            .map(|tag| TagDisplay {
                tag: tag.to_string(),
                count: frequency.get(tag),
                color: self.classifier.color(tag).to_string(),
                in_filter: self.filter.positive.iter().any(|t| t == tag),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Tag commands
    // ------------------------------------------------------------------

    /// Add tags to the selection, the visible images, or all images.
    pub fn add_tags(&mut self, tags: &[String], scope: Scope) -> Result<MutationOutcome, TagError> {
        let target = self.gallery.selected().cloned();
        let visible = self.gallery.visible().to_vec();
        let result = self.store.add_tags(target.as_ref(), tags, scope, &visible);
        self.after_mutation(result)
    }

    /// Remove tags from the selection, the visible images, or all images.
    pub fn remove_tags(&mut self, tags: &[String], scope: Scope) -> Result<MutationOutcome, TagError> {
        let target = self.gallery.selected().cloned();
        let visible = self.gallery.visible().to_vec();
        let result = self.store.remove_tags(target.as_ref(), tags, scope, &visible);
        self.after_mutation(result)
    }

    /// Drop duplicate tags.
    pub fn dedupe(&mut self, scope: Scope) -> Result<MutationOutcome, TagError> {
        let target = self.gallery.selected().cloned();
        let visible = self.gallery.visible().to_vec();
        let result = self.store.dedupe(target.as_ref(), scope, &visible);
        self.after_mutation(result)
    }

    /// Sort tags with the active classifier.
    pub fn sort(&mut self, scope: Scope) -> Result<MutationOutcome, TagError> {
        let target = self.gallery.selected().cloned();
        let visible = self.gallery.visible().to_vec();
        let result = self
            .store
            .sort(target.as_ref(), scope, &visible, &self.classifier);
        self.after_mutation(result)
    }

    /// Rename a tag on the selected image.
    pub fn rename_tag(&mut self, from: &str, to: &str) -> Result<MutationOutcome, TagError> {
        let Some(target) = self.gallery.selected().cloned() else {
            return Ok(MutationOutcome::default());
        };
        let result = self.store.rename_tag(&target, from, to);
        self.after_mutation(result)
    }

    /// Replace underscores with spaces in one tag of the selected image.
    pub fn replace_underscores(&mut self, tag: &str) -> Result<MutationOutcome, TagError> {
        let Some(target) = self.gallery.selected().cloned() else {
            return Ok(MutationOutcome::default());
        };
        let result = self.store.replace_underscores(&target, tag);
        self.after_mutation(result)
    }

    /// Rewrite the caption of an image whose earlier write failed.
    pub fn retry_write(&self, image: &ImageId) -> Result<(), TagError> {
        self.store.retry_write(image)
    }

    /// Delete an image and its caption, then re-select.
    pub fn delete(&mut self, image: &ImageId) -> Result<bool, TagError> {
        if !self.store.delete(image)? {
            return Ok(false);
        }
        let visible = filter::compute_visible(self.store.iter(), &self.filter);
        self.gallery.apply_deletion(image, visible);
        self.gallery.emit(GalleryEvent::ImageDeleted(image.clone()));
        Ok(true)
    }

    fn after_mutation(
        &mut self,
        result: Result<MutationOutcome, TagError>,
    ) -> Result<MutationOutcome, TagError> {
        let changed = match &result {
            Ok(outcome) => outcome.changed.clone(),
            Err(e) => e.changed().to_vec(),
        };
        if !changed.is_empty() {
            self.gallery.emit(GalleryEvent::TagsChanged(changed));
            self.refresh_visible();
        }
        result
    }

    // ------------------------------------------------------------------
    // Color schemes
    // ------------------------------------------------------------------

    /// Selectable scheme names.
    pub fn scheme_names(&self) -> Vec<&str> {
        self.catalog.names()
    }

    /// Name of the active scheme.
    pub fn scheme_name(&self) -> &str {
        &self.scheme_name
    }

    /// Switch the active scheme and remember it in the settings.
    ///
    /// If the scheme cannot be loaded, coloring is turned off and the error
    /// is returned. Row-level problems come back as warnings.
    pub fn change_scheme(&mut self, name: &str) -> Result<Vec<SchemeWarning>, SchemeError> {
        let loaded = self.catalog.load(name);
        let result = match loaded {
            Ok(Some(load)) => {
                self.classifier.set_scheme(Some(load.scheme));
                self.scheme_name = name.to_string();
                Ok(load.warnings)
            }
            Ok(None) => {
                self.classifier.set_scheme(None);
                self.scheme_name = NO_SCHEME.to_string();
                Ok(Vec::new())
            }
            Err(e) => {
                log::warn!("Color scheme '{}' unavailable: {}", name, e);
                self.classifier.set_scheme(None);
                self.scheme_name = NO_SCHEME.to_string();
                Err(e)
            }
        };

        self.settings.last_color_scheme = self.scheme_name.clone();
        self.save_settings();
        self.gallery
            .emit(GalleryEvent::SchemeChanged(self.scheme_name.clone()));
        result
    }

    /// Category-aware color of a tag under the active scheme.
    pub fn tag_color(&self, tag: &str) -> &str {
        self.classifier.color(tag)
    }

    fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save_to(path) {
            log::warn!("Failed to save settings to {:?}: {}", path, e);
        }
    }
}
