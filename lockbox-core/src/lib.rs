//! Lockbox Core - local-only accounts and sessions
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (User, SessionState, signup/login input)
//! - **ports**: Trait definitions for external dependencies (KeyValueStore)
//! - **services**: Business logic orchestration (UserStore, SessionManager)
//! - **adapters**: Concrete implementations (DuckDB file, in-memory map)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{DuckDbStore, MemoryStore};
use config::Config;
use ports::KeyValueStore;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{SessionState, StorageKey, User};
pub use services::{EntryPoint, LogEvent, LoggingService, SessionManager, UserStore};

/// Main context for Lockbox operations
///
/// Wires one key-value store to the user store, the session manager and the
/// optional event log. UI shells hold this and call into `session`.
pub struct LockboxContext {
    pub config: Config,
    pub data_dir: Option<PathBuf>,
    pub store: Arc<dyn KeyValueStore>,
    pub user_store: Arc<UserStore>,
    pub session: SessionManager,
    pub event_log: Option<Arc<LoggingService>>,
}

impl LockboxContext {
    /// Create a context persisted under `data_dir`
    ///
    /// The session starts `Initializing`; call `session.restore()` before
    /// showing anything that depends on the logged-in user.
    pub fn new(data_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        let config = Config::load(data_dir)?;
        let store_path = config.store_path(data_dir);
        let store: Arc<dyn KeyValueStore> = Arc::new(
            DuckDbStore::new(&store_path)
                .with_context(|| format!("Failed to open store: {:?}", store_path))?,
        );

        let event_log = if config.event_log {
            match LoggingService::new(data_dir, entry_point, env!("CARGO_PKG_VERSION")) {
                Ok(log) => Some(Arc::new(log)),
                Err(e) => {
                    // Logging should never block the app
                    tracing::warn!(error = %e, "Event log unavailable");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::assemble(config, Some(data_dir.to_path_buf()), store, event_log))
    }

    /// Create a context in the default data directory (see [`config::default_data_dir`])
    pub fn open_default(entry_point: EntryPoint) -> Result<Self> {
        Self::new(&config::default_data_dir(), entry_point)
    }

    /// Create a context whose data vanishes with the process
    pub fn in_memory() -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Self::assemble(Config::default(), None, store, None)
    }

    fn assemble(
        config: Config,
        data_dir: Option<PathBuf>,
        store: Arc<dyn KeyValueStore>,
        event_log: Option<Arc<LoggingService>>,
    ) -> Self {
        let user_store = Arc::new(UserStore::new(Arc::clone(&store)));
        let mut session = SessionManager::new(Arc::clone(&store), Arc::clone(&user_store));
        if let Some(log) = &event_log {
            session = session.with_event_log(Arc::clone(log));
        }

        Self {
            config,
            data_dir,
            store,
            user_store,
            session,
            event_log,
        }
    }
}
