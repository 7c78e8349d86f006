//! Session service - who is logged in
//!
//! The session is persisted as a single pointer (the logged-in user's id)
//! under the `currentUserId` key. In memory it is a [`SessionState`] held in
//! a watch channel so UI shells can observe it.
//!
//! Every mutating operation writes to storage first and only then publishes
//! the new state. A failed write leaves the state untouched.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::result::{Error, Result};
use crate::domain::{Credentials, SessionState, SignupForm, StorageKey, User};
use crate::ports::KeyValueStore;
use crate::services::logging::{LogEvent, LoggingService};
use crate::services::user_store::UserStore;

/// Owner of the in-memory session state
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    users: Arc<UserStore>,
    state: watch::Sender<SessionState>,
    event_log: Option<Arc<LoggingService>>,
}

impl SessionManager {
    /// Create a manager in the `Initializing` state
    ///
    /// Call [`SessionManager::restore`] once at startup to leave it.
    pub fn new(store: Arc<dyn KeyValueStore>, users: Arc<UserStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Initializing);
        Self {
            store,
            users,
            state,
            event_log: None,
        }
    }

    /// Record auth events in `event_log`
    pub fn with_event_log(mut self, event_log: Arc<LoggingService>) -> Self {
        self.event_log = Some(event_log);
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn user_store(&self) -> &Arc<UserStore> {
        &self.users
    }

    /// Rebuild the session from storage
    ///
    /// Never fails: a missing pointer, a pointer to an unknown user, malformed
    /// data and storage errors all end in `Unauthenticated`. If a login,
    /// signup or logout lands while the restore is running, its result wins.
    pub async fn restore(&self) -> SessionState {
        self.state.send_replace(SessionState::Initializing);

        let restored = match self.load_session().await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, "Session restored");
                self.record(LogEvent::new("session_restored").with_user(&user.id)).await;
                SessionState::Authenticated(user)
            }
            Ok(None) => {
                tracing::debug!("No session to restore");
                SessionState::Unauthenticated
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session restore failed, continuing logged out");
                self.record(
                    LogEvent::new("session_restore_failed")
                        .with_error(e.to_string())
                        .with_error_details(e.code()),
                )
                .await;
                SessionState::Unauthenticated
            }
        };

        self.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = restored;
                true
            } else {
                false
            }
        });

        self.state()
    }

    async fn load_session(&self) -> Result<Option<User>> {
        let Some(user_id) = self.store.get(StorageKey::CurrentUser.as_str()).await? else {
            return Ok(None);
        };

        let users = self.users.load_all().await?;
        let user = UserStore::find_by_id(&users, &user_id).cloned();
        if user.is_none() {
            tracing::debug!(user_id = %user_id, "Session points at an unknown user");
        }
        Ok(user)
    }

    /// Log in with an email/password pair
    ///
    /// Fails with [`Error::InvalidCredentials`] when no stored user matches
    /// both fields exactly, including when no user was ever registered.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let credentials = Credentials::new(email, password);

        match self.authenticate(&credentials).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Logged in");
                self.record(LogEvent::new("login_succeeded").with_user(&user.id)).await;
                Ok(user)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Login failed");
                self.record(
                    LogEvent::new("login_failed")
                        .with_error(e.to_string())
                        .with_error_details(e.code()),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User> {
        let users = self.users.load_all().await?;
        let user = users
            .into_iter()
            .find(|u| credentials.matches(u))
            .ok_or(Error::InvalidCredentials)?;

        self.start_session(user).await
    }

    /// Register a new account and log it in
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let form = SignupForm::new(name, email, password);

        match self.register(form).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Signed up");
                self.record(LogEvent::new("signup_succeeded").with_user(&user.id)).await;
                Ok(user)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Signup rejected");
                self.record(
                    LogEvent::new("signup_rejected")
                        .with_error(e.to_string())
                        .with_error_details(e.code()),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn register(&self, form: SignupForm) -> Result<User> {
        let user = self.users.create(form).await?;
        self.start_session(user).await
    }

    /// Persist the pointer, then publish the authenticated state
    async fn start_session(&self, user: User) -> Result<User> {
        self.store
            .set(StorageKey::CurrentUser.as_str(), &user.id)
            .await?;
        self.state
            .send_replace(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Forget the session pointer
    ///
    /// The user's account stays in the store and can log in again.
    pub async fn logout(&self) -> Result<()> {
        let previous = self.current_user();

        if let Err(e) = self.store.remove(StorageKey::CurrentUser.as_str()).await {
            tracing::warn!(error = %e, "Logout failed");
            self.record(
                LogEvent::new("logout")
                    .with_error(e.to_string())
                    .with_error_details(e.code()),
            )
            .await;
            return Err(e);
        }

        self.state.send_replace(SessionState::Unauthenticated);

        let mut event = LogEvent::new("logout");
        if let Some(user) = previous {
            event = event.with_user(user.id);
        }
        self.record(event).await;
        Ok(())
    }

    /// Remove an account from the store
    ///
    /// The session pointer is not touched, so removing the logged-in user
    /// keeps the in-memory session until logout or the next restore.
    pub async fn remove_user(&self, id: &str) -> Result<bool> {
        let removed = self.users.remove(id).await?;
        if removed {
            self.record(LogEvent::new("user_removed").with_user(id)).await;
        }
        Ok(removed)
    }

    /// Append `event` to the event log, if one is attached
    ///
    /// The DuckDB insert is synchronous, so it runs on the blocking pool.
    /// Failures are traced and otherwise ignored.
    async fn record(&self, event: LogEvent) {
        let Some(log) = &self.event_log else {
            return;
        };
        let log = Arc::clone(log);

        match tokio::task::spawn_blocking(move || log.log(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to write event log"),
            Err(e) => tracing::warn!(error = %e, "Event log task failed"),
        }
    }
}
