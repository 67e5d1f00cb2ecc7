pub mod loaded;
pub mod post;
pub mod query;

pub use loaded::Loaded;
pub use post::{is_valid_slug, Post, PostRecord};
pub use query::{clamp_page, PostFilter, PostPage, MAX_PAGE};
