//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod credentials;
mod keys;
mod session;
mod user;
pub mod result;

pub use credentials::{Credentials, SignupForm, MIN_PASSWORD_LEN};
pub use keys::StorageKey;
pub use session::SessionState;
pub use user::User;
