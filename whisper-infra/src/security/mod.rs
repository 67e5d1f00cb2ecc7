pub mod session;

pub use session::{AdminSession, MemorySessionService, SessionService};
