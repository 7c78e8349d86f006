//! User domain model

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Highest id handed out by this process
static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// A registered local account
///
/// Serialized as `{id, name, email, password}` inside the `users` key.
/// The password is kept verbatim; there is no hashing in this store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Generate a fresh id for a user about to join `existing`
    ///
    /// Ids are the creation time in milliseconds, pushed past every id this
    /// process already issued and every numeric id in `existing`. Ids stay
    /// strictly increasing within a process even when users are removed or
    /// the clock steps back.
    pub fn generate_id(existing: &[User]) -> String {
        let now = Utc::now().timestamp_millis();
        let stored_max = existing
            .iter()
            .filter_map(|u| u.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        let floor = now.max(stored_max.saturating_add(1));
        let previous = match LAST_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(floor.max(last.saturating_add(1)))
        }) {
            Ok(last) | Err(last) => last,
        };

        floor.max(previous.saturating_add(1)).to_string()
    }
}
