//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod logging;
mod session;
mod user_store;

pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use session::SessionManager;
pub use user_store::UserStore;
