//! User store service - the durable collection of registered accounts
//!
//! The whole collection lives as one JSON array under the `users` key and is
//! rewritten on every change. There is no partial update.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::{SignupForm, StorageKey, User};
use crate::ports::KeyValueStore;

/// Durable collection of [`User`] records
pub struct UserStore {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles issued through this store
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Read every stored user
    ///
    /// An absent key is an empty collection. Data that does not deserialize
    /// is an error.
    pub async fn load_all(&self) -> Result<Vec<User>> {
        match self.store.get(StorageKey::Users.as_str()).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the whole collection (last writer wins)
    pub async fn save_all(&self, users: &[User]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_all(users).await
    }

    pub fn find_by_email<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
        users.iter().find(|u| u.email == email)
    }

    pub fn find_by_id<'a>(users: &'a [User], id: &str) -> Option<&'a User> {
        users.iter().find(|u| u.id == id)
    }

    /// Register a new account
    ///
    /// Validates the form, loads the collection, rejects a taken email,
    /// assigns a fresh id and appends the user. The whole cycle holds the
    /// write lock, so two concurrent calls on the same store cannot lose each
    /// other's record.
    pub async fn create(&self, form: SignupForm) -> Result<User> {
        form.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut users = self.load_all().await?;
        if Self::find_by_email(&users, &form.email).is_some() {
            return Err(Error::validation("Email already exists"));
        }

        let user = form.into_user(User::generate_id(&users));
        users.push(user.clone());
        self.write_all(&users).await?;

        tracing::debug!(user_id = %user.id, total = users.len(), "User created");
        Ok(user)
    }

    /// Delete the user with `id`
    ///
    /// Returns false when no such user exists. The session pointer is left
    /// alone; a later restore pointing at this id comes back logged out.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.load_all().await?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }

        self.write_all(&users).await?;
        tracing::debug!(user_id = %id, total = users.len(), "User removed");
        Ok(true)
    }

    async fn write_all(&self, users: &[User]) -> Result<()> {
        let raw = serde_json::to_string(users)?;
        self.store.set(StorageKey::Users.as_str(), &raw).await
    }
}
