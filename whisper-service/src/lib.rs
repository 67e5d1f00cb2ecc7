pub mod content;
pub mod dispatch;
pub mod security;

#[cfg(test)]
pub(crate) mod test_support;

pub use content::{DefaultPostService, PostService};
pub use dispatch::{DispatchRequest, Dispatcher};
pub use security::{
    AuthConfig, AuthMethodConfig, AuthMethodRegistry, AuthPolicy, DefaultPasswordService,
    PasswordAlgorithm,
};
