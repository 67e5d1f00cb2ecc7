pub mod authentication;

pub use authentication::{AuthMethod, AuthRequest};
