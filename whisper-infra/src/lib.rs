pub mod cache;
pub mod database;
pub mod security;
pub mod storage;

pub use cache::{Cache, MemoryCache};
pub use database::{DatabaseManager, SeaOrmPostRepository};
pub use security::{AdminSession, MemorySessionService, SessionService};
pub use storage::LocalPostStorage;
