pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod security;


pub use app_state::AppState;
pub use config::AdminConfig;
pub use error::WebError;
pub use router::create_router;
pub use security::{session_middleware, Viewer, SESSION_COOKIE};
