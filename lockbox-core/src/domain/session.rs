//! Session state

use super::user::User;

/// Where the session manager currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup restore has not finished yet
    Initializing,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    /// The logged-in user, if any
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Initializing)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}
