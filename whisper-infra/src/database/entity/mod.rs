pub mod meta;
pub mod post;
pub mod tag;
