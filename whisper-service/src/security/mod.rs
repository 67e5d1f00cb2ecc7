pub mod methods;
pub mod password_service;
pub mod policy;

pub use methods::{CookieAuth, DummyAuth, PasswordAuth, UnimplementedAuth};
pub use password_service::{DefaultPasswordService, PasswordAlgorithm};
pub use policy::{AuthConfig, AuthMethodConfig, AuthMethodRegistry, AuthPolicy};
