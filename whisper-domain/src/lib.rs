pub mod content;
pub mod error;

pub use content::{clamp_page, is_valid_slug, Loaded, Post, PostFilter, PostPage, PostRecord, MAX_PAGE};
pub use error::ValidationError;
