pub mod admin;
pub mod auth;
pub mod site;

pub use admin::{admin_home, create_post, delete_post, edit_post, get_post, post_files};
pub use auth::{auth_check, auth_page, authenticate, deauth};
pub use site::{parse_page, parse_path, site_page};
