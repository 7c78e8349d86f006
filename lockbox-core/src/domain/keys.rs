//! Storage keys shared by the user store and the session manager

/// Keys in the shared storage namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    /// JSON array of every registered user
    Users,
    /// Raw id of the logged-in user, absent when logged out
    CurrentUser,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Users => "users",
            StorageKey::CurrentUser => "currentUserId",
        }
    }
}
