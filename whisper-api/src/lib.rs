pub mod error;
pub mod event;
pub mod provider;
pub mod repository;
pub mod security;
pub mod site;

pub use error::{Error, Result};
pub use event::{names, EventBus, EventHandler, EventPayload, HandlerError};
pub use provider::{
    ContentProvider, MainProvider, NotFoundContext, ProviderRegistry, ProviderResponse,
    RenderContext, MAIN_ALIAS, MAX_FORWARD_DEPTH,
};
pub use repository::{PostRepository, PostStorage, ProviderUsage};
pub use security::{AuthMethod, AuthRequest};
pub use site::{Site, SiteBuilder};
