//! Data models for the tag engine.

mod image;
mod tag;

pub use image::ImageId;
pub use tag::{CATEGORY_PRIORITY, TagCategory, normalize_tag, parse_tag_list};
