//! Selection and grid navigation over the visible images.
//!
//! The controller only knows the ordered visible ids and the grid width. It
//! never touches tags or files; the session feeds it new visible sets and
//! asks it to re-resolve the selection. Interested parties subscribe to
//! [`GalleryEvent`]s, which are delivered synchronously.

use std::fmt;
use std::path::PathBuf;

use crate::constants::DEFAULT_GRID_COLUMNS;
use crate::model::ImageId;

/// Arrow-key direction in the thumbnail grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Previous image
    Left,
    /// Next image
    Right,
    /// One row up
    Up,
    /// One row down
    Down,
}

/// Where keyboard focus currently is, as reported by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavContext {
    /// Focus on the gallery itself
    #[default]
    Gallery,
    /// Focus in a text entry; arrow keys belong to the entry
    TextInput,
}

/// Change notifications for the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    /// The selected image changed (or was re-selected)
    SelectionChanged(Option<ImageId>),
    /// The visible set was recomputed
    VisibleChanged {
        /// Number of visible images
        count: usize,
    },
    /// Tags of these images changed
    TagsChanged(Vec<ImageId>),
    /// An image and its caption were deleted
    ImageDeleted(ImageId),
    /// A folder scan finished and was applied
    FolderLoaded {
        /// Folder that was scanned
        folder: PathBuf,
        /// Number of images loaded
        images: usize,
    },
    /// The active color scheme changed
    SchemeChanged(String),
}

type Observer = Box<dyn Fn(&GalleryEvent) + Send + Sync>;

/// Selection state machine over the visible images.
pub struct GalleryController {
    visible: Vec<ImageId>,
    selection: Option<ImageId>,
    columns: usize,
    observers: Vec<Observer>,
}

impl fmt::Debug for GalleryController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryController")
            .field("visible", &self.visible.len())
            .field("selection", &self.selection)
            .field("columns", &self.columns)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for GalleryController {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_COLUMNS)
    }
}

impl GalleryController {
    /// Create an unselected controller for a grid of `columns` columns.
    pub fn new(columns: usize) -> Self {
        Self {
            visible: Vec::new(),
            selection: None,
            columns: columns.max(1),
            observers: Vec::new(),
        }
    }

    /// Register an observer for gallery events.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&GalleryEvent) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Deliver an event to every observer.
    pub fn emit(&self, event: GalleryEvent) {
        log::trace!("Gallery event: {:?}", event);
        for observer in &self.observers {
            observer(&event);
        }
    }

    /// Grid width used for up/down moves.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Change the grid width (at least 1).
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
    }

    /// Visible images in display order.
    pub fn visible(&self) -> &[ImageId] {
        &self.visible
    }

    /// Currently selected image.
    pub fn selected(&self) -> Option<&ImageId> {
        self.selection.as_ref()
    }

    /// Index of the selection in the visible set.
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selection.as_ref()?;
        self.visible.iter().position(|id| id == selected)
    }

    /// Whether arrow-key navigation should be handled in `context`.
    pub fn is_navigable(&self, context: NavContext) -> bool {
        context != NavContext::TextInput && self.selection.is_some()
    }

    /// Select a visible image. Returns `false` if it is not visible.
    pub fn select(&mut self, image: &ImageId) -> bool {
        if !self.visible.contains(image) {
            log::debug!("Ignoring selection of hidden image {}", image);
            return false;
        }
        self.set_selection(Some(image.clone()));
        true
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        if self.selection.is_some() {
            self.set_selection(None);
        }
    }

    fn set_selection(&mut self, selection: Option<ImageId>) {
        self.selection = selection;
        self.emit(GalleryEvent::SelectionChanged(self.selection.clone()));
    }

    /// Move the selection one step in the grid.
    ///
    /// Returns the newly selected image, or `None` if nothing moved.
    pub fn move_selection(&mut self, direction: Direction) -> Option<ImageId> {
        self.move_selection_where(direction, |_| true)
    }

    /// Like [`move_selection`](Self::move_selection), but does nothing while
    /// focus is in a text entry.
    pub fn move_in(&mut self, context: NavContext, direction: Direction) -> Option<ImageId> {
        if !self.is_navigable(context) {
            return None;
        }
        self.move_selection(direction)
    }

    /// Move the selection, stepping over entries for which `is_live` is false.
    ///
    /// Moves clamp at the edges of the grid; there is no wraparound.
    pub fn move_selection_where<F>(&mut self, direction: Direction, is_live: F) -> Option<ImageId>
    where
        F: Fn(&ImageId) -> bool,
    {
        let current = self.selected_index()?;
        let len = self.visible.len();
        let cols = self.columns;

        let mut index = current;
        loop {
            index = match direction {
                Direction::Left if index > 0 => index - 1,
                Direction::Right if index + 1 < len => index + 1,
                Direction::Up if index >= cols => index - cols,
                Direction::Down if index + cols < len => index + cols,
                _ => return None,
            };
            if is_live(&self.visible[index]) {
                break;
            }
        }

        let target = self.visible[index].clone();
        self.set_selection(Some(target.clone()));
        Some(target)
    }

    /// Replace the visible set and re-resolve the selection.
    ///
    /// A selection that is still visible is kept. Otherwise the first visible
    /// image is selected, or the selection is cleared if nothing is visible.
    pub fn refresh_visible(&mut self, visible: Vec<ImageId>) {
        self.visible = visible;
        self.emit(GalleryEvent::VisibleChanged {
            count: self.visible.len(),
        });

        let still_visible = self
            .selection
            .as_ref()
            .is_some_and(|s| self.visible.contains(s));
        if still_visible {
            return;
        }
        match self.visible.first().cloned() {
            Some(first) => self.set_selection(Some(first)),
            None => self.clear_selection(),
        }
    }

    /// Apply a deletion: install the new visible set and re-select.
    ///
    /// If the deleted image was visible, the image now at its index is
    /// selected, else the one before it, else nothing. Otherwise this behaves
    /// like [`refresh_visible`](Self::refresh_visible).
    pub fn apply_deletion(&mut self, deleted: &ImageId, visible: Vec<ImageId>) {
        let old_index = self.visible.iter().position(|id| id == deleted);
        let Some(index) = old_index else {
            self.refresh_visible(visible);
            return;
        };

        self.visible = visible;
        self.emit(GalleryEvent::VisibleChanged {
            count: self.visible.len(),
        });

        let next = self
            .visible
            .get(index)
            .or_else(|| index.checked_sub(1).and_then(|i| self.visible.get(i)))
            .cloned();
        match next {
            Some(next) => self.set_selection(Some(next)),
            None => self.clear_selection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn ids(n: usize) -> Vec<ImageId> {
        (0..n).map(|i| ImageId::from(format!("{i}.png").as_str())).collect()
    }

    fn controller(n: usize) -> (GalleryController, Vec<ImageId>) {
        let all = ids(n);
        let mut gallery = GalleryController::new(3);
        gallery.refresh_visible(all.clone());
        (gallery, all)
    }

    #[test]
    fn test_starts_unselected() {
        let gallery = GalleryController::default();
        assert!(gallery.selected().is_none());
        assert_eq!(gallery.columns(), DEFAULT_GRID_COLUMNS);
    }

    #[test]
    fn test_refresh_selects_first_visible() {
        let (gallery, all) = controller(4);
        assert_eq!(gallery.selected(), Some(&all[0]));
    }

    #[test]
    fn test_select_requires_visibility() {
        let (mut gallery, all) = controller(4);
        assert!(gallery.select(&all[2]));
        assert!(!gallery.select(&ImageId::from("hidden.png")));
        assert_eq!(gallery.selected(), Some(&all[2]));
    }

    #[test]
    fn test_horizontal_moves_clamp() {
        let (mut gallery, all) = controller(4);
        assert_eq!(gallery.move_selection(Direction::Left), None);
        assert_eq!(gallery.move_selection(Direction::Right), Some(all[1].clone()));

        gallery.select(&all[3]);
        assert_eq!(gallery.move_selection(Direction::Right), None);
        assert_eq!(gallery.selected(), Some(&all[3]));
    }

    #[test]
    fn test_vertical_moves_use_column_count() {
        // 0 1 2
        // 3 4 5
        // 6
        let (mut gallery, all) = controller(7);
        gallery.select(&all[1]);
        assert_eq!(gallery.move_selection(Direction::Down), Some(all[4].clone()));
        // Nothing below 4 in the last row
        assert_eq!(gallery.move_selection(Direction::Down), None);
        assert_eq!(gallery.move_selection(Direction::Up), Some(all[1].clone()));
        assert_eq!(gallery.move_selection(Direction::Up), None);

        gallery.select(&all[3]);
        assert_eq!(gallery.move_selection(Direction::Down), Some(all[6].clone()));
    }

    #[test]
    fn test_move_skips_stale_entries() {
        let (mut gallery, all) = controller(4);
        let stale = all[1].clone();
        let moved = gallery.move_selection_where(Direction::Right, |id| *id != stale);
        assert_eq!(moved, Some(all[2].clone()));

        // Everything to the left is stale: no move
        let moved = gallery.move_selection_where(Direction::Left, |id| *id == all[2]);
        assert_eq!(moved, None);
        assert_eq!(gallery.selected(), Some(&all[2]));
    }

    #[test]
    fn test_no_move_without_selection_or_in_text_input() {
        let mut gallery = GalleryController::new(3);
        assert_eq!(gallery.move_selection(Direction::Right), None);

        let (mut gallery, all) = controller(3);
        assert!(!gallery.is_navigable(NavContext::TextInput));
        assert_eq!(gallery.move_in(NavContext::TextInput, Direction::Right), None);
        assert_eq!(
            gallery.move_in(NavContext::Gallery, Direction::Right),
            Some(all[1].clone())
        );
    }

    #[test]
    fn test_refresh_keeps_visible_selection() {
        let (mut gallery, all) = controller(4);
        gallery.select(&all[2]);
        gallery.refresh_visible(vec![all[0].clone(), all[2].clone()]);
        assert_eq!(gallery.selected(), Some(&all[2]));

        gallery.refresh_visible(vec![all[3].clone()]);
        assert_eq!(gallery.selected(), Some(&all[3]));

        gallery.refresh_visible(Vec::new());
        assert!(gallery.selected().is_none());
    }

    #[test]
    fn test_deleting_middle_selects_next() {
        let (mut gallery, all) = controller(3);
        gallery.select(&all[1]);
        gallery.apply_deletion(&all[1], vec![all[0].clone(), all[2].clone()]);
        assert_eq!(gallery.selected(), Some(&all[2]));
        assert_eq!(gallery.selected_index(), Some(1));
    }

    #[test]
    fn test_deleting_last_selects_previous() {
        let (mut gallery, all) = controller(3);
        gallery.select(&all[2]);
        gallery.apply_deletion(&all[2], vec![all[0].clone(), all[1].clone()]);
        assert_eq!(gallery.selected(), Some(&all[1]));
    }

    #[test]
    fn test_deleting_only_image_unselects() {
        let (mut gallery, all) = controller(1);
        gallery.apply_deletion(&all[0], Vec::new());
        assert!(gallery.selected().is_none());
    }

    #[test]
    fn test_observers_receive_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut gallery = GalleryController::new(3);
        gallery.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let all = ids(2);
        gallery.refresh_visible(all.clone());
        gallery.select(&all[1]);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                GalleryEvent::VisibleChanged { count: 2 },
                GalleryEvent::SelectionChanged(Some(all[0].clone())),
                GalleryEvent::SelectionChanged(Some(all[1].clone())),
            ]
        );
    }
}
