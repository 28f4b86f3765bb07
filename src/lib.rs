//! captag - tag metadata engine for image datasets
//!
//! Loads a folder of images with comma-separated `.txt` caption sidecars and
//! offers scoped tag edits, tag sorting and coloring by classification
//! scheme, positive/negative filtering and gallery selection. Every edit is
//! written straight back to the sidecar files.

pub mod caption;
pub mod classifier;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod model;
pub mod project;
pub mod scheme;
pub mod session;
pub mod store;

pub use caption::{CaptionStore, SidecarCaptions};
pub use classifier::Classifier;
pub use config::AppSettings;
pub use error::TagError;
pub use filter::{FilterSpec, NegativeMode, PositiveMode};
pub use gallery::{Direction, GalleryController, GalleryEvent, NavContext};
pub use model::{ImageId, TagCategory};
pub use scheme::{ClassificationScheme, SchemeCatalog, SchemeError};
pub use session::{Session, SharedSession};
pub use store::{FrequencyIndex, Scope, TagStore};
